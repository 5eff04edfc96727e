use crate::assets::color::Color;
use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::GlowResult;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Paint state for one draw call, the subset of a 2D canvas context the effect relies on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawStyle {
    pub color: Color,
    /// Global alpha in `[0, 1]`, multiplied into `color`.
    pub alpha: f64,
    /// Stroke width for stroking calls; ignored by fills.
    pub line_width: f64,
    /// Shadow blur radius in pixels. `0` disables glow.
    pub glow_blur: f64,
    /// Shadow color.
    pub glow_color: Color,
}

impl DrawStyle {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            alpha: 1.0,
            line_width: 1.0,
            glow_blur: 0.0,
            glow_color: color,
        }
    }

    /// Glow in the stroke color, as both traces and chips use.
    pub fn glowing(color: Color, line_width: f64, glow_blur: f64) -> Self {
        Self {
            color,
            alpha: 1.0,
            line_width,
            glow_blur,
            glow_color: color,
        }
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Fill/stroke color with global alpha applied.
    pub fn effective_color(&self) -> Color {
        self.color.with_alpha(self.alpha)
    }

    /// Glow color with global alpha applied.
    pub fn effective_glow(&self) -> Color {
        self.glow_color.with_alpha(self.alpha)
    }
}

/// Canvas-like drawing target.
///
/// Every method takes its complete paint state, so implementations need no save/restore stack.
pub trait Surface {
    /// Current size in pixels.
    fn size(&self) -> Canvas;

    /// Resize the backing store; contents become unspecified.
    fn resize(&mut self, canvas: Canvas) -> GlowResult<()>;

    /// Fill the whole surface with `color`, discarding previous contents.
    fn clear(&mut self, color: Color) -> GlowResult<()>;

    /// Stroke connected line segments through `points`, oldest first.
    fn stroke_polyline(&mut self, points: &[Point], style: &DrawStyle) -> GlowResult<()>;

    fn stroke_rect(&mut self, rect: Rect, style: &DrawStyle) -> GlowResult<()>;

    fn fill_rect(&mut self, rect: Rect, style: &DrawStyle) -> GlowResult<()>;

    /// Fill `text` with its alphabetic baseline starting at `origin`.
    fn fill_text(
        &mut self,
        text: &str,
        origin: Point,
        size_px: f32,
        style: &DrawStyle,
    ) -> GlowResult<()>;
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn size(&self) -> Canvas {
        (**self).size()
    }

    fn resize(&mut self, canvas: Canvas) -> GlowResult<()> {
        (**self).resize(canvas)
    }

    fn clear(&mut self, color: Color) -> GlowResult<()> {
        (**self).clear(color)
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &DrawStyle) -> GlowResult<()> {
        (**self).stroke_polyline(points, style)
    }

    fn stroke_rect(&mut self, rect: Rect, style: &DrawStyle) -> GlowResult<()> {
        (**self).stroke_rect(rect, style)
    }

    fn fill_rect(&mut self, rect: Rect, style: &DrawStyle) -> GlowResult<()> {
        (**self).fill_rect(rect, style)
    }

    fn fill_text(
        &mut self,
        text: &str,
        origin: Point,
        size_px: f32,
        style: &DrawStyle,
    ) -> GlowResult<()> {
        (**self).fill_text(text, origin, size_px, style)
    }
}
