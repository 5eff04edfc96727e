use std::path::{Path, PathBuf};

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{GlowError, GlowResult};
use crate::render::surface::FrameRGBA;

/// Writes each frame as `<prefix>_<index>.png` (index zero-padded to five digits) into one
/// directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    out_dir: PathBuf,
    prefix: String,
    cfg: Option<SinkConfig>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            prefix: "frame".to_owned(),
            cfg: None,
            written: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn path_for(&self, idx: FrameIndex) -> PathBuf {
        self.out_dir.join(format!("{}_{:05}.png", self.prefix, idx.0))
    }

    /// Files written so far, in push order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> GlowResult<()> {
        std::fs::create_dir_all(&self.out_dir).map_err(|e| {
            GlowError::encode(format!(
                "failed to create output directory '{}': {e}",
                self.out_dir.display()
            ))
        })?;
        self.cfg = Some(cfg);
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlowResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| GlowError::encode("png sink not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(GlowError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let path = self.path_for(idx);
        write_png(&path, frame)?;
        tracing::trace!(path = %path.display(), "png frame written");
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> GlowResult<()> {
        self.cfg = None;
        Ok(())
    }
}

/// Encode `frame` as a straight-alpha RGBA PNG at `path`, creating parent directories.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> GlowResult<()> {
    let expected = (frame.width as usize) * (frame.height as usize) * 4;
    if frame.data.len() != expected {
        return Err(GlowError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }
    ensure_parent_dir(path)?;

    let straight;
    let data = if frame.premultiplied {
        straight = unpremultiply_rgba8(&frame.data);
        straight.as_slice()
    } else {
        frame.data.as_slice()
    };

    image::save_buffer_with_format(
        path,
        data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| GlowError::encode(format!("failed to write png '{}': {e}", path.display())))
}

fn unpremultiply_rgba8(src: &[u8]) -> Vec<u8> {
    let mut out = src.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        match a {
            255 => {}
            0 => px[..3].fill(0),
            _ => {
                for c in &mut px[..3] {
                    *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
    }
    out
}
