use crate::foundation::error::{GlowError, GlowResult};
use crate::foundation::math::mul_div255_u8;

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Axis-aligned pixel window of a larger buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelRegion {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl PixelRegion {
    pub(crate) fn byte_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    pub(crate) fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Composite `src` (sized like `region`) over the matching window of `dst`.
pub(crate) fn over_region_in_place(
    dst: &mut [u8],
    dst_width: u32,
    dst_height: u32,
    src: &[u8],
    region: PixelRegion,
) -> GlowResult<()> {
    if src.len() != region.byte_len() {
        return Err(GlowError::render(
            "over_region_in_place expects src matching region size",
        ));
    }
    if dst.len() != dst_width as usize * dst_height as usize * 4 {
        return Err(GlowError::render(
            "over_region_in_place expects dst matching width*height*4",
        ));
    }
    if region.x + region.width > dst_width || region.y + region.height > dst_height {
        return Err(GlowError::render("composite region exceeds destination"));
    }

    let row_bytes = region.width as usize * 4;
    for row in 0..region.height as usize {
        let src_row = &src[row * row_bytes..(row + 1) * row_bytes];
        let dst_start = ((region.y as usize + row) * dst_width as usize + region.x as usize) * 4;
        let dst_row = &mut dst[dst_start..dst_start + row_bytes];
        for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}
