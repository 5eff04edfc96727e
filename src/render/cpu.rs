use crate::assets::color::Color;
use crate::assets::font::LabelFont;
use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::{GlowError, GlowResult};
use crate::render::blur::{ShadowKernel, blur_rgba8_premul};
use crate::render::composite::{PixelRegion, over_region_in_place};
use crate::render::surface::{DrawStyle, FrameRGBA, Surface};

/// Raster [`Surface`] powered by `vello_cpu`.
///
/// Each draw call is rasterized into a scratch buffer covering only its bounding box (plus the
/// glow margin), optionally blurred for the glow, and composited source-over into the frame.
pub struct CpuSurface {
    size: Canvas,
    data: Vec<u8>,
    font: Option<LabelFont>,
    warned_no_font: bool,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("size", &self.size)
            .field("font", &self.font)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy)]
enum Geometry<'a> {
    Polyline(&'a [Point]),
    StrokeRect(Rect),
    FillRect(Rect),
}

impl CpuSurface {
    pub fn new(size: Canvas) -> GlowResult<Self> {
        check_dims(size)?;
        Ok(Self {
            size,
            data: vec![0u8; size.pixel_count() * 4],
            font: None,
            warned_no_font: false,
        })
    }

    /// Font used by [`Surface::fill_text`]. Without one, text calls draw nothing.
    pub fn with_label_font(mut self, font: LabelFont) -> Self {
        self.font = Some(font);
        self
    }

    /// Copy of the current contents as premultiplied RGBA8.
    pub fn frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.size.width,
            height: self.size.height,
            data: self.data.clone(),
            premultiplied: true,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    fn paint(&mut self, geometry: Geometry<'_>, style: &DrawStyle) -> GlowResult<()> {
        let stroke_pad = match geometry {
            Geometry::Polyline(_) | Geometry::StrokeRect(_) => style.line_width / 2.0 + 1.0,
            Geometry::FillRect(_) => 1.0,
        };
        let bounds = match geometry {
            Geometry::Polyline(points) => match points_bounds(points) {
                Some(b) => b,
                None => return Ok(()),
            },
            Geometry::StrokeRect(r) | Geometry::FillRect(r) => r.abs(),
        };
        let line_width = style.line_width;
        let draw = |ctx: &mut vello_cpu::RenderContext, _base: vello_cpu::kurbo::Affine| {
            match geometry {
                Geometry::Polyline(points) => {
                    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(line_width));
                    ctx.stroke_path(&polyline_to_cpu(points));
                }
                Geometry::StrokeRect(r) => {
                    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(line_width));
                    ctx.stroke_rect(&rect_to_cpu(r));
                }
                Geometry::FillRect(r) => ctx.fill_rect(&rect_to_cpu(r)),
            }
        };
        self.paint_with(bounds, stroke_pad, style, draw)
    }

    /// Rasterize `draw` twice when glowing (blurred glow pass, then the sharp pass) and
    /// composite both into the frame.
    fn paint_with(
        &mut self,
        bounds: Rect,
        pad: f64,
        style: &DrawStyle,
        draw: impl Fn(&mut vello_cpu::RenderContext, vello_cpu::kurbo::Affine),
    ) -> GlowResult<()> {
        if style.alpha <= 0.0 {
            return Ok(());
        }
        let kernel = ShadowKernel::for_shadow_blur(style.glow_blur);
        let glow_pad = kernel.map(|k| f64::from(k.radius_px)).unwrap_or(0.0);
        let Some(region) = self.clip_region(bounds.inflate(pad + glow_pad, pad + glow_pad)) else {
            return Ok(());
        };

        if let Some(k) = kernel {
            let glow = self.rasterize(region, style.effective_glow(), &draw)?;
            let blurred =
                blur_rgba8_premul(&glow, region.width, region.height, k.radius_px, k.sigma)?;
            over_region_in_place(
                &mut self.data,
                self.size.width,
                self.size.height,
                &blurred,
                region,
            )?;
        }

        let sharp = self.rasterize(region, style.effective_color(), &draw)?;
        over_region_in_place(
            &mut self.data,
            self.size.width,
            self.size.height,
            &sharp,
            region,
        )
    }

    fn clip_region(&self, r: Rect) -> Option<PixelRegion> {
        let x0 = r.x0.floor().max(0.0);
        let y0 = r.y0.floor().max(0.0);
        let x1 = r.x1.ceil().min(self.size.width_f64());
        let y1 = r.y1.ceil().min(self.size.height_f64());
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        let region = PixelRegion {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        };
        (!region.is_empty()).then_some(region)
    }

    fn rasterize(
        &self,
        region: PixelRegion,
        color: Color,
        draw: &impl Fn(&mut vello_cpu::RenderContext, vello_cpu::kurbo::Affine),
    ) -> GlowResult<Vec<u8>> {
        let (w, h) = region_dims_u16(region)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let base =
            vello_cpu::kurbo::Affine::translate((-f64::from(region.x), -f64::from(region.y)));
        ctx.set_transform(base);
        let [r, g, b, a] = color.to_rgba8();
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        draw(&mut ctx, base);
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(pixmap.data_as_u8_slice().to_vec())
    }
}

impl Surface for CpuSurface {
    fn size(&self) -> Canvas {
        self.size
    }

    fn resize(&mut self, canvas: Canvas) -> GlowResult<()> {
        check_dims(canvas)?;
        if canvas != self.size {
            tracing::debug!(width = canvas.width, height = canvas.height, "resize cpu surface");
            self.size = canvas;
            self.data = vec![0u8; canvas.pixel_count() * 4];
        }
        Ok(())
    }

    fn clear(&mut self, color: Color) -> GlowResult<()> {
        let premul = color.to_rgba8_premul().to_array();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
        Ok(())
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &DrawStyle) -> GlowResult<()> {
        if points.len() < 2 {
            return Ok(());
        }
        self.paint(Geometry::Polyline(points), style)
    }

    fn stroke_rect(&mut self, rect: Rect, style: &DrawStyle) -> GlowResult<()> {
        self.paint(Geometry::StrokeRect(rect), style)
    }

    fn fill_rect(&mut self, rect: Rect, style: &DrawStyle) -> GlowResult<()> {
        self.paint(Geometry::FillRect(rect), style)
    }

    fn fill_text(
        &mut self,
        text: &str,
        origin: Point,
        size_px: f32,
        style: &DrawStyle,
    ) -> GlowResult<()> {
        let Some(font) = self.font.as_mut() else {
            if !self.warned_no_font {
                tracing::debug!("no label font configured; text is not drawn");
                self.warned_no_font = true;
            }
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }

        let layout = font.layout_line(text, size_px)?;
        let font_data = font.font_data().clone();

        let mut width = 0.0f64;
        let mut height = 0.0f64;
        let mut baseline = 0.0f64;
        for (i, line) in layout.lines().enumerate() {
            let m = line.metrics();
            if i == 0 {
                baseline = f64::from(m.baseline);
            }
            width = width.max(f64::from(m.advance));
            height += f64::from(m.ascent + m.descent + m.leading);
        }
        let top_left = Point::new(origin.x, origin.y - baseline);
        let bounds = Rect::from_origin_size(top_left, (width, height));

        let draw = |ctx: &mut vello_cpu::RenderContext, base: vello_cpu::kurbo::Affine| {
            let shift = vello_cpu::kurbo::Affine::translate((top_left.x, top_left.y));
            ctx.set_transform(base * shift);
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font_data)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        };
        self.paint_with(bounds, 1.0, style, draw)
    }
}

fn check_dims(canvas: Canvas) -> GlowResult<()> {
    if canvas.width > u32::from(u16::MAX) || canvas.height > u32::from(u16::MAX) {
        return Err(GlowError::validation(format!(
            "surface {}x{} exceeds {}x{}",
            canvas.width,
            canvas.height,
            u16::MAX,
            u16::MAX
        )));
    }
    Ok(())
}

fn region_dims_u16(region: PixelRegion) -> GlowResult<(u16, u16)> {
    let w: u16 = region
        .width
        .try_into()
        .map_err(|_| GlowError::render("region width exceeds u16"))?;
    let h: u16 = region
        .height
        .try_into()
        .map_err(|_| GlowError::render("region height exceeds u16"))?;
    Ok((w, h))
}

fn points_bounds(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let init = Rect::from_points(*first, *first);
    Some(points.iter().fold(init, |acc, p| acc.union_pt(*p)))
}

fn polyline_to_cpu(points: &[Point]) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        out.move_to((first.x, first.y));
        for p in iter {
            out.line_to((p.x, p.y));
        }
    }
    out
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
