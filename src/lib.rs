#![forbid(unsafe_code)]

//! Animated circuit-trace background.
//!
//! Four chip glyphs sit near the viewport corners while short-lived traces spawn next to them,
//! wander on axis-aligned headings and fade out. [`AnimationLoop`] owns the per-frame cycle and
//! draws through the [`Surface`] trait; [`CpuSurface`] rasterizes with glow, and
//! [`HeadlessRenderer`] drives the loop offline into a [`FrameSink`].

pub mod assets;
pub mod config;
pub mod encode;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod session;

pub use assets::color::Color;
pub use assets::font::LabelFont;
pub use config::{ChipConfig, GlowConfig, TraceConfig};
pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use encode::png::{PngSequenceSink, write_png};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use foundation::clock::{Clock, MonotonicClock, VirtualClock};
pub use foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Rgba8Premul};
pub use foundation::error::{GlowError, GlowResult};
pub use foundation::rng::{RandomSource, ScriptedRandom, StdRandom};
pub use render::cpu::CpuSurface;
pub use render::recording::{CallLog, RecordingSurface, SurfaceCall};
pub use render::surface::{DrawStyle, FrameRGBA, Surface};
pub use scene::chip::{ChipDecoration, ChipLayout};
pub use scene::trace::{TraceEntity, TraceStatus};
pub use scene::trail::Trail;
pub use session::animation::{AnimationLoop, FrameOutcome};
pub use session::headless::{HeadlessHost, HeadlessRenderer};
pub use session::host::{CancelToken, FrameHandle, ListenerId, ViewHost};
