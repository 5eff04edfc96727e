use crate::assets::color::Color;
use crate::config::ChipConfig;
use crate::foundation::core::{Canvas, Point, Rect, Vec2};
use crate::foundation::error::GlowResult;
use crate::render::surface::{DrawStyle, Surface};

const PINS_PER_SIDE: u32 = 4;
const PIN_WIDTH: f64 = 4.0;
const PIN_LENGTH: f64 = 6.0;
const INNER_INSET: f64 = 0.2;
const INNER_SCALE: f64 = 0.6;
const LABEL_RISE: f64 = 10.0;

/// A static chip glyph: outer square, inner die, pins on top and bottom, and a label above.
#[derive(Clone, Debug, PartialEq)]
pub struct ChipDecoration {
    pub origin: Point,
    pub size: f64,
    pub label: String,
}

impl ChipDecoration {
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin, (self.size, self.size))
    }

    /// Center of the chip, where traces attached to it spawn.
    pub fn anchor(&self) -> Point {
        self.origin + Vec2::new(self.size / 2.0, self.size / 2.0)
    }

    pub fn inner_bounds(&self) -> Rect {
        let inset = self.size * INNER_INSET;
        let side = self.size * INNER_SCALE;
        Rect::from_origin_size(self.origin + Vec2::new(inset, inset), (side, side))
    }

    /// Pin rectangles, top row left to right then bottom row left to right.
    pub fn pins(&self) -> Vec<Rect> {
        let pitch = self.size / f64::from(PINS_PER_SIDE);
        let mut top = Vec::with_capacity(PINS_PER_SIDE as usize);
        let mut bottom = Vec::with_capacity(PINS_PER_SIDE as usize);
        for i in 0..PINS_PER_SIDE {
            let x = self.origin.x + f64::from(i) * pitch + pitch / 2.0 - PIN_WIDTH / 2.0;
            top.push(Rect::from_origin_size(
                (x, self.origin.y - PIN_LENGTH),
                (PIN_WIDTH, PIN_LENGTH),
            ));
            bottom.push(Rect::from_origin_size(
                (x, self.origin.y + self.size),
                (PIN_WIDTH, PIN_LENGTH),
            ));
        }
        top.extend(bottom);
        top
    }

    /// Baseline origin of the label.
    pub fn label_origin(&self) -> Point {
        Point::new(self.origin.x, self.origin.y - LABEL_RISE)
    }

    pub fn draw<S>(&self, surface: &mut S, color: Color, params: &ChipConfig) -> GlowResult<()>
    where
        S: Surface + ?Sized,
    {
        let style = DrawStyle::glowing(color, params.line_width, params.glow_blur);
        surface.stroke_rect(self.bounds(), &style)?;
        surface.stroke_rect(self.inner_bounds(), &style)?;
        for pin in self.pins() {
            surface.fill_rect(pin, &style)?;
        }
        surface.fill_text(
            &self.label,
            self.label_origin(),
            params.label_size_px,
            &style,
        )
    }
}

/// The four corner chips for one viewport size, in label order: top-left, top-right,
/// bottom-left, bottom-right.
#[derive(Clone, Debug, PartialEq)]
pub struct ChipLayout {
    chips: [ChipDecoration; 4],
}

impl ChipLayout {
    pub fn for_viewport(canvas: Canvas, params: &ChipConfig) -> Self {
        let s = params.size;
        let left = params.margin_x;
        let right = canvas.width_f64() - params.margin_x - s;
        let top = params.margin_y;
        let bottom = canvas.height_f64() - params.margin_y - s;
        let origins = [
            Point::new(left, top),
            Point::new(right, top),
            Point::new(left, bottom),
            Point::new(right, bottom),
        ];
        let chips = std::array::from_fn(|i| ChipDecoration {
            origin: origins[i],
            size: s,
            label: params.labels[i].clone(),
        });
        Self { chips }
    }

    pub fn chips(&self) -> &[ChipDecoration; 4] {
        &self.chips
    }

    pub fn anchors(&self) -> [Point; 4] {
        std::array::from_fn(|i| self.chips[i].anchor())
    }

    pub fn draw<S>(&self, surface: &mut S, color: Color, params: &ChipConfig) -> GlowResult<()>
    where
        S: Surface + ?Sized,
    {
        for chip in &self.chips {
            chip.draw(surface, color, params)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/chip.rs"]
mod tests;
