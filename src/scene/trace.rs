use std::f64::consts::FRAC_PI_2;

use crate::assets::color::Color;
use crate::config::TraceConfig;
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::GlowResult;
use crate::foundation::rng::RandomSource;
use crate::render::surface::{DrawStyle, Surface};
use crate::scene::trail::Trail;

/// Result of one [`TraceEntity::update`] tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceStatus {
    Alive,
    Expired,
}

/// One animated circuit trace: a head that walks along axis-aligned headings, leaving a
/// bounded trail, and fades out at the end of its life.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceEntity {
    position: Point,
    heading: f64,
    trail: Trail,
    created_at_ms: f64,
    opacity: f64,
    flicker: f64,
    expired: bool,
}

impl TraceEntity {
    pub fn new(anchor: Point, heading: f64, created_at_ms: f64, trail_capacity: usize) -> Self {
        Self {
            position: anchor,
            heading,
            trail: Trail::starting_at(anchor, trail_capacity),
            created_at_ms,
            opacity: 1.0,
            flicker: 1.0,
            expired: false,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Heading in radians.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn created_at_ms(&self) -> f64 {
        self.created_at_ms
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn flicker(&self) -> f64 {
        self.flicker
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Advance one tick at time `now_ms`.
    ///
    /// Reaching `kill_ms` of age is terminal: opacity drops to zero, the trace is marked
    /// expired and nothing else changes, now or on any later call.
    pub fn update<R>(&mut self, now_ms: f64, params: &TraceConfig, rng: &mut R) -> TraceStatus
    where
        R: RandomSource + ?Sized,
    {
        if self.expired {
            return TraceStatus::Expired;
        }

        let elapsed = now_ms - self.created_at_ms;
        if elapsed >= params.kill_ms {
            self.opacity = 0.0;
            self.expired = true;
            return TraceStatus::Expired;
        }

        let fade_start = params.kill_ms - params.fade_ms;
        if elapsed > fade_start {
            let ramp = (1.0 - (elapsed - fade_start) / params.fade_ms).clamp(0.0, 1.0);
            self.opacity = self.opacity.min(ramp);
            self.flicker = if rng.chance(params.flicker_full_probability) {
                1.0
            } else {
                params.flicker_dim
            };
        }

        if rng.chance(params.turn_probability) {
            self.heading += if rng.chance(0.5) {
                FRAC_PI_2
            } else {
                -FRAC_PI_2
            };
        }

        self.position.x += self.heading.cos() * params.speed;
        self.position.y += self.heading.sin() * params.speed;
        self.trail.push(self.position);

        TraceStatus::Alive
    }

    /// Draw the trail and head marker. Draws nothing once fully transparent.
    pub fn draw<S>(&self, surface: &mut S, color: Color, params: &TraceConfig) -> GlowResult<()>
    where
        S: Surface + ?Sized,
    {
        if self.expired || self.opacity <= 0.0 {
            return Ok(());
        }

        let style = DrawStyle::glowing(color, params.line_width, params.glow_blur)
            .with_alpha(self.opacity * self.flicker);
        surface.stroke_polyline(&self.trail.to_vec(), &style)?;

        let head = Rect::from_center_size(self.position, (params.head_size, params.head_size));
        surface.fill_rect(head, &style)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/trace.rs"]
mod tests;
