use std::{cell::RefCell, rc::Rc};

use crate::assets::color::Color;
use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::{GlowError, GlowResult};
use crate::render::surface::{DrawStyle, Surface};

/// One recorded [`Surface`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCall {
    Resize(Canvas),
    Clear(Color),
    StrokePolyline {
        points: Vec<Point>,
        style: DrawStyle,
    },
    StrokeRect {
        rect: Rect,
        style: DrawStyle,
    },
    FillRect {
        rect: Rect,
        style: DrawStyle,
    },
    FillText {
        text: String,
        origin: Point,
        size_px: f32,
        style: DrawStyle,
    },
}

/// Shared view of the calls made on a [`RecordingSurface`]; stays readable after the surface
/// has been moved into (or dropped by) an animation loop.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<SurfaceCall>>>,
}

impl CallLog {
    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    pub fn snapshot(&self) -> Vec<SurfaceCall> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn push(&self, call: SurfaceCall) {
        self.calls.borrow_mut().push(call);
    }
}

/// Surface that draws nothing and records every call.
#[derive(Debug)]
pub struct RecordingSurface {
    size: Canvas,
    log: CallLog,
    fail_draws: bool,
}

impl RecordingSurface {
    pub fn new(size: Canvas) -> Self {
        Self {
            size,
            log: CallLog::default(),
            fail_draws: false,
        }
    }

    /// A surface whose drawing calls all fail with a render error.
    pub fn failing(size: Canvas) -> Self {
        Self {
            fail_draws: true,
            ..Self::new(size)
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    fn record(&mut self, call: SurfaceCall) -> GlowResult<()> {
        self.log.push(call);
        if self.fail_draws {
            return Err(GlowError::render("recording surface configured to fail"));
        }
        Ok(())
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Canvas {
        self.size
    }

    fn resize(&mut self, canvas: Canvas) -> GlowResult<()> {
        self.size = canvas;
        self.log.push(SurfaceCall::Resize(canvas));
        Ok(())
    }

    fn clear(&mut self, color: Color) -> GlowResult<()> {
        self.record(SurfaceCall::Clear(color))
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &DrawStyle) -> GlowResult<()> {
        self.record(SurfaceCall::StrokePolyline {
            points: points.to_vec(),
            style: *style,
        })
    }

    fn stroke_rect(&mut self, rect: Rect, style: &DrawStyle) -> GlowResult<()> {
        self.record(SurfaceCall::StrokeRect {
            rect,
            style: *style,
        })
    }

    fn fill_rect(&mut self, rect: Rect, style: &DrawStyle) -> GlowResult<()> {
        self.record(SurfaceCall::FillRect {
            rect,
            style: *style,
        })
    }

    fn fill_text(
        &mut self,
        text: &str,
        origin: Point,
        size_px: f32,
        style: &DrawStyle,
    ) -> GlowResult<()> {
        self.record(SurfaceCall::FillText {
            text: text.to_owned(),
            origin,
            size_px,
            style: *style,
        })
    }
}
