use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "glowtrace", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the animation up to one frame and write that frame as a PNG.
    Frame(FrameArgs),
    /// Render a PNG sequence.
    Frames(FramesArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Frames per second of virtual time.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed for a reproducible animation. Omit for a random one.
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding any subset of the default look.
    #[arg(long)]
    config: Option<PathBuf>,

    /// TTF/OTF font for chip labels. Labels are skipped without one.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FramesArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Number of frames to render.
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Output directory for `frame_NNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Number of frames to render.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .try_init();
}

fn make_renderer(scene: &SceneArgs) -> anyhow::Result<glowtrace::HeadlessRenderer> {
    let config = match &scene.config {
        Some(path) => glowtrace::GlowConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => glowtrace::GlowConfig::default(),
    };
    let canvas = glowtrace::Canvas::new(scene.width, scene.height);
    let fps = glowtrace::Fps::new(scene.fps, 1)?;

    let mut renderer = glowtrace::HeadlessRenderer::new(canvas, fps, config);
    if let Some(seed) = scene.seed {
        renderer = renderer.with_seed(seed);
    }
    if let Some(path) = &scene.font {
        let font = glowtrace::LabelFont::from_path(path)
            .with_context(|| format!("load font '{}'", path.display()))?;
        renderer = renderer.with_label_font(font);
    }
    Ok(renderer)
}

/// Keeps only the most recent frame.
#[derive(Default)]
struct LastFrameSink {
    last: Option<glowtrace::FrameRGBA>,
}

impl glowtrace::FrameSink for LastFrameSink {
    fn begin(&mut self, _cfg: glowtrace::SinkConfig) -> glowtrace::GlowResult<()> {
        self.last = None;
        Ok(())
    }

    fn push_frame(
        &mut self,
        _idx: glowtrace::FrameIndex,
        frame: &glowtrace::FrameRGBA,
    ) -> glowtrace::GlowResult<()> {
        self.last = Some(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> glowtrace::GlowResult<()> {
        Ok(())
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let renderer = make_renderer(&args.scene)?;
    let mut sink = LastFrameSink::default();
    renderer
        .render(args.frame + 1, &mut sink)
        .with_context(|| format!("render frame {}", args.frame))?;
    let frame = sink.last.context("no frame was rendered")?;

    glowtrace::write_png(&args.out, &frame)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let renderer = make_renderer(&args.scene)?;
    let mut sink = glowtrace::PngSequenceSink::new(&args.out_dir);
    renderer
        .render(args.frames, &mut sink)
        .with_context(|| format!("render png sequence into '{}'", args.out_dir.display()))?;

    eprintln!(
        "wrote {} frames to {}",
        sink.written().len(),
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let renderer = make_renderer(&args.scene)?;
    let mut sink = glowtrace::FfmpegSink::new(glowtrace::FfmpegSinkOpts::new(&args.out));
    renderer
        .render(args.frames, &mut sink)
        .with_context(|| format!("render mp4 '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
