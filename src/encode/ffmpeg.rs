//! MP4 output through the system `ffmpeg` binary.
//!
//! Frames are piped as raw RGBA8 into `ffmpeg`'s stdin and encoded with libx264. The background
//! clears every pixel to an opaque color each frame, so frames normally go straight to the pipe;
//! anything translucent is flattened onto [`FfmpegSinkOpts::background`] first.

use std::ffi::OsString;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::assets::color::Color;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{GlowError, GlowResult};
use crate::render::composite::{PremulRgba8, over};
use crate::render::surface::FrameRGBA;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Replace an existing file instead of failing.
    pub overwrite: bool,
    /// Color translucent pixels are flattened onto. Its own alpha is ignored.
    pub background: Color,
    /// libx264 constant rate factor; `None` keeps ffmpeg's default.
    pub crf: Option<u8>,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Color::BLACK,
            crf: None,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = Some(crf);
        self
    }

    fn background_premul(&self) -> PremulRgba8 {
        let bg = Color {
            a: 1.0,
            ..self.background
        }
        .to_rgba8_premul();
        [bg.r, bg.g, bg.b, 255]
    }
}

/// Streams frames into a spawned `ffmpeg`, producing an H.264 MP4 without audio.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    flattened: Vec<u8>,
    frames: u64,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            cfg: None,
            last_idx: None,
            flattened: Vec::new(),
            frames: 0,
        }
    }

    /// Frames accepted since the last `begin`.
    pub fn frames_written(&self) -> u64 {
        self.frames
    }
}

impl std::fmt::Debug for FfmpegSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSink")
            .field("opts", &self.opts)
            .field("running", &self.encoder.is_some())
            .field("frames", &self.frames)
            .finish()
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> GlowResult<()> {
        if self.encoder.is_some() {
            return Err(GlowError::encode("ffmpeg sink already started"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(GlowError::validation("mp4 width/height must be non-zero"));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(GlowError::validation(format!(
                "mp4 width/height must be even for yuv420p, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(GlowError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let args = encoder_args(&self.opts, &cfg);
        tracing::debug!(out = %self.opts.out_path.display(), ?args, "spawning ffmpeg");
        self.encoder = Some(Encoder::spawn(&args)?);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlowResult<()> {
        let (Some(cfg), Some(encoder)) = (self.cfg.as_ref(), self.encoder.as_mut()) else {
            return Err(GlowError::encode("ffmpeg sink not started"));
        };
        if self.last_idx.is_some_and(|last| idx <= last) {
            return Err(GlowError::encode(format!(
                "frame {} pushed after frame {}",
                idx.0,
                self.last_idx.map_or(0, |l| l.0)
            )));
        }
        if (frame.width, frame.height) != (cfg.width, cfg.height) {
            return Err(GlowError::validation(format!(
                "frame is {}x{}, sink expects {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if !frame.premultiplied || frame.data.len() != cfg.width as usize * cfg.height as usize * 4
        {
            return Err(GlowError::validation(
                "ffmpeg sink expects tightly packed premultiplied rgba8",
            ));
        }

        let bytes = opaque_rgba8(
            &frame.data,
            &mut self.flattened,
            self.opts.background_premul(),
        );
        encoder.write(bytes)?;
        self.last_idx = Some(idx);
        self.frames += 1;
        Ok(())
    }

    fn end(&mut self) -> GlowResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| GlowError::encode("ffmpeg sink not started"))?;
        self.cfg = None;
        encoder.finish()?;
        tracing::debug!(
            frames = self.frames,
            out = %self.opts.out_path.display(),
            "mp4 written"
        );
        Ok(())
    }
}

/// A running `ffmpeg` child with its stderr drained on a side thread so a chatty encoder never
/// blocks on a full pipe.
struct Encoder {
    child: Child,
    stdin: ChildStdin,
    stderr: JoinHandle<std::io::Result<Vec<u8>>>,
}

impl Encoder {
    fn spawn(args: &[OsString]) -> GlowResult<Self> {
        let mut child = Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GlowError::encode(format!("cannot run ffmpeg (is it on PATH?): {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GlowError::encode("ffmpeg stdin unavailable"))?;
        let mut stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| GlowError::encode("ffmpeg stderr unavailable"))?;
        let stderr = std::thread::spawn(move || {
            let mut buf = Vec::new();
            stderr_pipe.read_to_end(&mut buf)?;
            Ok(buf)
        });
        Ok(Self {
            child,
            stdin,
            stderr,
        })
    }

    fn write(&mut self, bytes: &[u8]) -> GlowResult<()> {
        self.stdin
            .write_all(bytes)
            .map_err(|e| GlowError::encode(format!("ffmpeg stopped accepting frames: {e}")))
    }

    fn finish(self) -> GlowResult<()> {
        let Self {
            mut child,
            stdin,
            stderr,
        } = self;
        drop(stdin);
        let status = child
            .wait()
            .map_err(|e| GlowError::encode(format!("waiting for ffmpeg failed: {e}")))?;
        let log = stderr
            .join()
            .map_err(|_| GlowError::encode("ffmpeg stderr reader panicked"))?
            .map_err(|e| GlowError::encode(format!("reading ffmpeg stderr failed: {e}")))?;
        if !status.success() {
            return Err(GlowError::encode(format!(
                "ffmpeg exited with {status}: {}",
                String::from_utf8_lossy(&log).trim()
            )));
        }
        Ok(())
    }
}

fn encoder_args(opts: &FfmpegSinkOpts, cfg: &SinkConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![if opts.overwrite { "-y" } else { "-n" }.into()];
    for a in ["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"] {
        args.push(a.into());
    }
    args.push("-s".into());
    args.push(format!("{}x{}", cfg.width, cfg.height).into());
    // input rate goes before `-i`
    args.push("-r".into());
    args.push(format!("{}/{}", cfg.fps.num, cfg.fps.den).into());
    for a in ["-i", "pipe:0", "-an", "-c:v", "libx264", "-pix_fmt", "yuv420p"] {
        args.push(a.into());
    }
    if let Some(crf) = opts.crf {
        args.push("-crf".into());
        args.push(crf.to_string().into());
    }
    args.push("-movflags".into());
    args.push("+faststart".into());
    args.push(opts.out_path.clone().into_os_string());
    args
}

/// Bytes ready for the encoder: `src` itself when every pixel is opaque, otherwise `src`
/// composited over `bg` into `scratch`.
fn opaque_rgba8<'a>(src: &'a [u8], scratch: &'a mut Vec<u8>, bg: PremulRgba8) -> &'a [u8] {
    if src.chunks_exact(4).all(|px| px[3] == 255) {
        return src;
    }
    scratch.clear();
    scratch.reserve(src.len());
    for px in src.chunks_exact(4) {
        scratch.extend_from_slice(&over(bg, [px[0], px[1], px[2], px[3]]));
    }
    scratch
}

/// Create the parent directory of `path` if it is missing.
pub(crate) fn ensure_parent_dir(path: &Path) -> GlowResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}
