use std::f64::consts::FRAC_PI_2;

use crate::config::GlowConfig;
use crate::foundation::clock::Clock;
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::GlowResult;
use crate::foundation::rng::RandomSource;
use crate::render::surface::Surface;
use crate::scene::chip::ChipLayout;
use crate::scene::trace::TraceEntity;
use crate::session::host::{CancelToken, FrameHandle, ListenerId, ViewHost};

/// What a call to [`AnimationLoop::on_frame`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was drawn (and the next one scheduled unless cancellation arrived meanwhile).
    Drawn,
    /// The handle is not the one the loop is waiting for; nothing happened.
    Stale,
    /// The loop has been torn down or its token cancelled; nothing happened.
    Inert,
}

/// The background animation: four corner chips plus a live set of wandering traces, redrawn
/// once per host frame.
///
/// All state lives in this value, so any number of loops can run side by side. Randomness,
/// time and the drawing surface are injected.
pub struct AnimationLoop<S, R, C> {
    surface: Option<S>,
    config: GlowConfig,
    rng: R,
    clock: C,
    token: CancelToken,
    viewport: Canvas,
    chips: ChipLayout,
    traces: Vec<TraceEntity>,
    pending: Option<FrameHandle>,
    listener: Option<ListenerId>,
    frames_drawn: u64,
}

impl<S, R, C> std::fmt::Debug for AnimationLoop<S, R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationLoop")
            .field("mounted", &self.surface.is_some())
            .field("viewport", &self.viewport)
            .field("traces", &self.traces.len())
            .field("pending", &self.pending)
            .field("frames_drawn", &self.frames_drawn)
            .finish_non_exhaustive()
    }
}

impl<S, R, C> AnimationLoop<S, R, C>
where
    S: Surface,
    R: RandomSource,
    C: Clock,
{
    /// Attach to `host`, draw the first frame and schedule the next.
    ///
    /// Returns `None` without raising anything visible when there is no surface, the config is
    /// invalid, the token is already cancelled, or the surface cannot be sized or drawn.
    #[tracing::instrument(skip_all)]
    pub fn mount<H>(
        host: &mut H,
        surface: Option<S>,
        config: GlowConfig,
        rng: R,
        clock: C,
        token: CancelToken,
    ) -> Option<Self>
    where
        H: ViewHost + ?Sized,
    {
        let Some(mut surface) = surface else {
            tracing::debug!("no drawing surface; animation not started");
            return None;
        };
        if let Err(err) = config.validate() {
            tracing::debug!(%err, "invalid config; animation not started");
            return None;
        }
        if token.is_cancelled() {
            tracing::debug!("cancelled before mount");
            return None;
        }

        let viewport = host.viewport();
        if let Err(err) = surface.resize(viewport) {
            tracing::debug!(%err, "surface cannot match viewport; animation not started");
            return None;
        }

        let chips = ChipLayout::for_viewport(viewport, &config.chips);
        let listener = host.add_resize_listener();
        let mut this = Self {
            surface: Some(surface),
            config,
            rng,
            clock,
            token,
            viewport,
            chips,
            traces: Vec::new(),
            pending: None,
            listener: Some(listener),
            frames_drawn: 0,
        };

        if let Err(err) = this.draw_frame() {
            tracing::debug!(%err, "first frame failed; animation not started");
            this.teardown(host);
            return None;
        }
        this.pending = Some(host.request_frame());
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            "animation mounted"
        );
        Some(this)
    }

    /// Host callback for a frame requested earlier.
    ///
    /// On error the loop stops scheduling itself; the caller decides whether to tear it down.
    /// A token cancelled from outside stops drawing and scheduling, but the resize listener stays
    /// attached until [`AnimationLoop::teardown`].
    pub fn on_frame<H>(&mut self, host: &mut H, handle: FrameHandle) -> GlowResult<FrameOutcome>
    where
        H: ViewHost + ?Sized,
    {
        if self.surface.is_none() || self.token.is_cancelled() {
            if self.pending == Some(handle) {
                self.pending = None;
            }
            return Ok(FrameOutcome::Inert);
        }
        if self.pending != Some(handle) {
            tracing::trace!(?handle, pending = ?self.pending, "stale frame callback");
            return Ok(FrameOutcome::Stale);
        }
        self.pending = None;

        self.draw_frame()?;

        if !self.token.is_cancelled() {
            self.pending = Some(host.request_frame());
        }
        Ok(FrameOutcome::Drawn)
    }

    /// Host callback for a viewport change. Live traces keep their positions; only the surface
    /// and the chip layout follow the new size.
    pub fn on_resize(&mut self, canvas: Canvas) -> GlowResult<()> {
        if self.token.is_cancelled() {
            return Ok(());
        }
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        surface.resize(canvas)?;
        self.viewport = canvas;
        self.chips = ChipLayout::for_viewport(canvas, &self.config.chips);
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            "animation resized"
        );
        Ok(())
    }

    /// Stop the loop: cancel the token and the pending frame, detach the resize listener, drop
    /// every trace and hand back the surface. Every later callback is a no-op.
    #[tracing::instrument(skip_all)]
    pub fn teardown<H>(&mut self, host: &mut H) -> Option<S>
    where
        H: ViewHost + ?Sized,
    {
        self.token.cancel();
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
        if let Some(id) = self.listener.take() {
            host.remove_resize_listener(id);
        }
        let dropped = self.traces.len();
        self.traces.clear();
        let surface = self.surface.take();
        if surface.is_some() {
            tracing::debug!(dropped, frames = self.frames_drawn, "animation torn down");
        }
        surface
    }

    fn draw_frame(&mut self) -> GlowResult<()> {
        let Self {
            surface,
            config,
            rng,
            clock,
            chips,
            traces,
            frames_drawn,
            ..
        } = self;
        let Some(surface) = surface.as_mut() else {
            return Ok(());
        };
        let now = clock.now_ms();

        surface.clear(config.background)?;
        chips.draw(surface, config.color, &config.chips)?;

        if rng.chance(config.spawn_probability) {
            let anchors = chips.anchors();
            let anchor = anchors[rng.pick_index(anchors.len())];
            let heading = rng.pick_index(4) as f64 * FRAC_PI_2;
            traces.push(TraceEntity::new(
                anchor,
                heading,
                now,
                config.trace.trail_capacity,
            ));
            tracing::trace!(x = anchor.x, y = anchor.y, heading, "trace spawned");
        }

        let mut result = Ok(());
        let before = traces.len();
        traces.retain_mut(|trace| {
            if result.is_err() {
                return true;
            }
            trace.update(now, &config.trace, rng);
            if let Err(err) = trace.draw(surface, config.color, &config.trace) {
                result = Err(err);
            }
            !trace.is_expired()
        });
        result?;

        let culled = before - traces.len();
        if culled > 0 {
            tracing::trace!(culled, live = traces.len(), "expired traces removed");
        }
        *frames_drawn += 1;
        Ok(())
    }
}

impl<S, R, C> AnimationLoop<S, R, C> {
    /// Live traces in processing order.
    pub fn traces(&self) -> &[TraceEntity] {
        &self.traces
    }

    pub fn chips(&self) -> &ChipLayout {
        &self.chips
    }

    pub fn anchors(&self) -> [Point; 4] {
        self.chips.anchors()
    }

    pub fn viewport(&self) -> Canvas {
        self.viewport
    }

    pub fn config(&self) -> &GlowConfig {
        &self.config
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// `false` once torn down.
    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// The frame the loop is waiting for, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/animation.rs"]
mod tests;
