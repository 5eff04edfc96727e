use std::collections::{BTreeSet, VecDeque};

use crate::assets::font::LabelFont;
use crate::config::GlowConfig;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::clock::VirtualClock;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{GlowError, GlowResult};
use crate::foundation::rng::StdRandom;
use crate::render::cpu::CpuSurface;
use crate::session::animation::{AnimationLoop, FrameOutcome};
use crate::session::host::{CancelToken, FrameHandle, ListenerId, ViewHost};

/// In-process [`ViewHost`]: requested frames queue up until the driver pulls them with
/// [`HeadlessHost::next_frame`].
#[derive(Debug)]
pub struct HeadlessHost {
    viewport: Canvas,
    next_id: u64,
    queued: VecDeque<FrameHandle>,
    listeners: BTreeSet<ListenerId>,
    requested: u64,
    cancelled: u64,
}

impl HeadlessHost {
    pub fn new(viewport: Canvas) -> Self {
        Self {
            viewport,
            next_id: 0,
            queued: VecDeque::new(),
            listeners: BTreeSet::new(),
            requested: 0,
            cancelled: 0,
        }
    }

    /// Pop the oldest scheduled frame, as a display refresh would.
    pub fn next_frame(&mut self) -> Option<FrameHandle> {
        self.queued.pop_front()
    }

    pub fn queued_frames(&self) -> usize {
        self.queued.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Change the viewport. Returns `true` when a resize listener is registered and should be
    /// notified.
    pub fn set_viewport(&mut self, canvas: Canvas) -> bool {
        self.viewport = canvas;
        !self.listeners.is_empty()
    }

    /// Frames requested over the host's lifetime.
    pub fn requested_count(&self) -> u64 {
        self.requested
    }

    /// Frames cancelled while still queued.
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}

impl ViewHost for HeadlessHost {
    fn viewport(&self) -> Canvas {
        self.viewport
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.queued.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.queued.len();
        self.queued.retain(|h| *h != handle);
        if self.queued.len() != before {
            self.cancelled += 1;
        }
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.insert(id);
        id
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }
}

/// Drives an [`AnimationLoop`] on a [`CpuSurface`] with virtual time and feeds every frame to a
/// [`FrameSink`].
#[derive(Debug)]
pub struct HeadlessRenderer {
    canvas: Canvas,
    fps: Fps,
    config: GlowConfig,
    seed: Option<u64>,
    font: Option<LabelFont>,
}

impl HeadlessRenderer {
    pub fn new(canvas: Canvas, fps: Fps, config: GlowConfig) -> Self {
        Self {
            canvas,
            fps,
            config,
            seed: None,
            font: None,
        }
    }

    /// Use a reproducible random stream instead of OS entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_label_font(mut self, font: LabelFont) -> Self {
        self.font = Some(font);
        self
    }

    /// Render `frames` frames, `1000 / fps` virtual milliseconds apart, into `sink`.
    #[tracing::instrument(skip(self, sink))]
    pub fn render<K>(self, frames: u64, sink: &mut K) -> GlowResult<()>
    where
        K: FrameSink + ?Sized,
    {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(GlowError::validation("canvas width/height must be non-zero"));
        }
        self.config.validate()?;

        let mut host = HeadlessHost::new(self.canvas);
        let mut surface = CpuSurface::new(self.canvas)?;
        if let Some(font) = self.font {
            surface = surface.with_label_font(font);
        }
        let clock = VirtualClock::new();
        let rng = match self.seed {
            Some(seed) => StdRandom::seeded(seed),
            None => StdRandom::from_os(),
        };
        let frame_ms = self.fps.frame_duration_ms();

        let mut anim = AnimationLoop::mount(
            &mut host,
            Some(surface),
            self.config,
            rng,
            clock.clone(),
            CancelToken::new(),
        )
        .ok_or_else(|| GlowError::render("animation failed to mount"))?;

        sink.begin(SinkConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            fps: self.fps,
        })?;

        let result = (|| -> GlowResult<()> {
            for i in 0..frames {
                if i > 0 {
                    clock.advance(frame_ms);
                    let handle = host
                        .next_frame()
                        .ok_or_else(|| GlowError::render("no frame scheduled"))?;
                    let outcome = anim.on_frame(&mut host, handle)?;
                    if outcome != FrameOutcome::Drawn {
                        return Err(GlowError::render(format!(
                            "frame {i} was not drawn: {outcome:?}"
                        )));
                    }
                }
                let surface = anim
                    .surface()
                    .ok_or_else(|| GlowError::render("surface released mid-render"))?;
                sink.push_frame(FrameIndex(i), &surface.frame())?;
                tracing::trace!(frame = i, live = anim.traces().len(), "frame rendered");
            }
            Ok(())
        })();

        anim.teardown(&mut host);
        result?;
        sink.end()?;
        tracing::debug!(frames, "headless render finished");
        Ok(())
    }
}
