//! Tunables of the background effect.
//!
//! Defaults reproduce the reference look exactly; a JSON file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::error::{GlowError, GlowResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlowConfig {
    /// Stroke and glow color of traces and chips.
    pub color: Color,
    /// Solid fill applied at the start of every frame.
    pub background: Color,
    /// Probability of spawning one trace per frame.
    pub spawn_probability: f64,
    pub trace: TraceConfig,
    pub chips: ChipConfig,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            color: Color::GLOW,
            background: Color::BLACK,
            spawn_probability: 0.1,
            trace: TraceConfig::default(),
            chips: ChipConfig::default(),
        }
    }
}

/// Upper bound on `trace.trail_capacity`, in points.
pub const MAX_TRAIL_CAPACITY: usize = 1_000_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    /// Forward movement per update, in pixels.
    pub speed: f64,
    /// Total lifetime in milliseconds.
    pub kill_ms: f64,
    /// Length of the fade window that ends at `kill_ms`.
    pub fade_ms: f64,
    pub trail_capacity: usize,
    pub turn_probability: f64,
    /// Probability of full brightness when flicker is resampled.
    pub flicker_full_probability: f64,
    /// Flicker factor used when the full-brightness draw fails.
    pub flicker_dim: f64,
    pub line_width: f64,
    pub glow_blur: f64,
    pub head_size: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            speed: 0.8,
            kill_ms: 10_000.0,
            fade_ms: 2_000.0,
            trail_capacity: 80,
            turn_probability: 0.03,
            flicker_full_probability: 0.9,
            flicker_dim: 0.3,
            line_width: 1.5,
            glow_blur: 8.0,
            head_size: 4.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChipConfig {
    /// Outer square side length.
    pub size: f64,
    /// Horizontal inset of the left chips; right chips sit `margin_x + size` from the right edge.
    pub margin_x: f64,
    /// Vertical inset of the top chips; bottom chips sit `margin_y + size` from the bottom edge.
    pub margin_y: f64,
    pub line_width: f64,
    pub glow_blur: f64,
    pub label_size_px: f32,
    /// Labels in order: top-left, top-right, bottom-left, bottom-right.
    pub labels: [String; 4],
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            size: 50.0,
            margin_x: 60.0,
            margin_y: 100.0,
            line_width: 2.0,
            glow_blur: 12.0,
            label_size_px: 10.0,
            labels: [
                "ZYRO_v2k26".to_owned(),
                "BUS_CTRL".to_owned(),
                "PWR_MGMT".to_owned(),
                "CORE_LOGIC".to_owned(),
            ],
        }
    }
}

impl GlowConfig {
    pub fn from_json_str(s: &str) -> GlowResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| GlowError::serde(format!("invalid config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> GlowResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| {
            GlowError::validation(format!("failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> GlowResult<()> {
        check_probability("spawn_probability", self.spawn_probability)?;
        self.trace.validate()?;
        self.chips.validate()
    }
}

impl TraceConfig {
    pub fn validate(&self) -> GlowResult<()> {
        check_non_negative("trace.speed", self.speed)?;
        check_positive("trace.kill_ms", self.kill_ms)?;
        check_non_negative("trace.fade_ms", self.fade_ms)?;
        if self.fade_ms > self.kill_ms {
            return Err(GlowError::validation(
                "trace.fade_ms must not exceed trace.kill_ms",
            ));
        }
        if self.trail_capacity == 0 || self.trail_capacity > MAX_TRAIL_CAPACITY {
            return Err(GlowError::validation(format!(
                "trace.trail_capacity must be within [1, {MAX_TRAIL_CAPACITY}], got {}",
                self.trail_capacity
            )));
        }
        check_probability("trace.turn_probability", self.turn_probability)?;
        check_probability(
            "trace.flicker_full_probability",
            self.flicker_full_probability,
        )?;
        check_probability("trace.flicker_dim", self.flicker_dim)?;
        check_positive("trace.line_width", self.line_width)?;
        check_non_negative("trace.glow_blur", self.glow_blur)?;
        check_non_negative("trace.head_size", self.head_size)
    }
}

impl ChipConfig {
    pub fn validate(&self) -> GlowResult<()> {
        check_positive("chips.size", self.size)?;
        check_non_negative("chips.margin_x", self.margin_x)?;
        check_non_negative("chips.margin_y", self.margin_y)?;
        check_positive("chips.line_width", self.line_width)?;
        check_non_negative("chips.glow_blur", self.glow_blur)?;
        check_positive("chips.label_size_px", f64::from(self.label_size_px))
    }
}

fn check_probability(name: &str, v: f64) -> GlowResult<()> {
    if !(0.0..=1.0).contains(&v) {
        return Err(GlowError::validation(format!(
            "{name} must be within [0, 1], got {v}"
        )));
    }
    Ok(())
}

fn check_positive(name: &str, v: f64) -> GlowResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(GlowError::validation(format!(
            "{name} must be finite and > 0, got {v}"
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, v: f64) -> GlowResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(GlowError::validation(format!(
            "{name} must be finite and >= 0, got {v}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
