use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use storyreel::{
    CaptureOpts, CaptureOrchestrator, CompositorStyle, Container, FfmpegEncoder,
    FfmpegEncoderOpts, FrameCompositor, NarrationFile, NarrationSource, Pacing, PreviewRequest,
    RenderLoop, SilentNarration, Storyboard,
};

#[derive(Parser, Debug)]
#[command(name = "storyreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record the storyboard under its narration (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Compose the frame shown at one playback time as a PNG.
    Frame(FrameArgs),
    /// Print segment cue points and durations as JSON.
    Timeline(TimelineArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ContainerArg {
    Webm,
    Mp4,
}

#[derive(Parser, Debug)]
struct NarrationArgs {
    /// Narration audio file; defaults to the storyboard's `audio` entry.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Use silence of this many seconds instead of an audio file.
    #[arg(long, conflicts_with = "audio")]
    silent: Option<f64>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input storyboard JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    narration: NarrationArgs,

    /// Capture options JSON; flags below override it.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Caption font file (TTF/OTF).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output container.
    #[arg(long, value_enum)]
    container: Option<ContainerArg>,

    /// Advance playback virtually instead of in real time.
    #[arg(long, default_value_t = false)]
    offline: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input storyboard JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Playback time in seconds.
    #[arg(long)]
    t: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    narration: NarrationArgs,

    /// Capture options JSON.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Caption font file (TTF/OTF).
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Input storyboard JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    narration: NarrationArgs,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Timeline(args) => cmd_timeline(args),
    }
}

fn load_opts(path: Option<&Path>, font: Option<PathBuf>) -> anyhow::Result<CaptureOpts> {
    let mut opts = match path {
        Some(p) => CaptureOpts::from_json_file(p)?,
        None => CaptureOpts::default(),
    };
    if font.is_some() {
        opts.font = font;
    }
    Ok(opts)
}

fn narration_for(
    args: &NarrationArgs,
    board: &Storyboard,
) -> anyhow::Result<Option<Box<dyn NarrationSource>>> {
    if let Some(secs) = args.silent {
        return Ok(Some(Box::new(SilentNarration::new(secs))));
    }
    let path = match &args.audio {
        Some(p) => Some(p.clone()),
        None => board.audio_path()?,
    };
    Ok(path.map(|p| Box::new(NarrationFile::new(p)) as Box<dyn NarrationSource>))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let board = Storyboard::from_json_file(&args.in_path)?;
    let segments = board.snapshot()?;
    let narration = narration_for(&args.narration, &board)?;

    let mut opts = load_opts(args.opts.as_deref(), args.font.clone())?;
    if let Some(c) = args.container {
        opts.container = match c {
            ContainerArg::Webm => Container::Webm,
            ContainerArg::Mp4 => Container::Mp4,
        };
    }
    if args.offline {
        opts.pacing = Pacing::Offline;
    }

    let mut encoder = FfmpegEncoder::new(FfmpegEncoderOpts {
        container: opts.container,
        ..FfmpegEncoderOpts::default()
    });
    let mut orchestrator = CaptureOrchestrator::new(opts)?;
    let req = PreviewRequest {
        audio: narration.as_deref(),
        segments: &segments,
    };
    let artifact = orchestrator
        .capture(req, &mut encoder)
        .with_context(|| format!("capture '{}'", args.in_path.display()))?;
    artifact.write_to(&args.out)?;

    eprintln!(
        "wrote {} ({} frames, {:.2}s, {})",
        args.out.display(),
        artifact.frames,
        artifact.duration_secs,
        artifact.handle
    );
    Ok(())
}

fn narration_duration(args: &NarrationArgs, board: &Storyboard) -> anyhow::Result<f64> {
    let narration = narration_for(args, board)?
        .ok_or_else(|| anyhow::anyhow!("no narration: pass --audio or --silent"))?;
    Ok(narration.load_metadata()?.duration_secs)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let board = Storyboard::from_json_file(&args.in_path)?;
    let segments = board.snapshot()?;
    let duration = narration_duration(&args.narration, &board)?;
    let opts = load_opts(args.opts.as_deref(), args.font.clone())?;

    let font = opts
        .font
        .as_deref()
        .map(storyreel::CaptionFont::from_file)
        .transpose()?;
    let style: CompositorStyle = opts.style.clone();
    let mut compositor = FrameCompositor::new(opts.canvas, style, font)?;
    let images = storyreel::resolve_images(&segments)?;
    let timeline = storyreel::allocate(&segments, duration);

    let mut render = RenderLoop::new(&segments, &images, &timeline, &mut compositor)?;
    let (idx, frame) = render.tick(args.t)?;

    storyreel::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} (segment {idx})", args.out.display());
    Ok(())
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let board = Storyboard::from_json_file(&args.in_path)?;
    let segments = board.snapshot()?;
    let duration = narration_duration(&args.narration, &board)?;
    let timeline = storyreel::allocate(&segments, duration);
    println!("{}", serde_json::to_string_pretty(&timeline)?);
    Ok(())
}
