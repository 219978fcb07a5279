use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pixbeat", version, about = "Beat-synchronized pixel-grid music videos")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the graphics events mapped from a feature file as JSON.
    Events(EventsArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a full video from a job request (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct SongArgs {
    /// Audio features JSON from the analyzer.
    #[arg(long)]
    features: PathBuf,

    /// Visual template: pixel_runner, equalizer, waveform or square_boom.
    #[arg(long, default_value = "square_boom")]
    template: String,

    /// Project settings JSON; defaults when omitted.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override the settings seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct EventsArgs {
    #[command(flatten)]
    song: SongArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    song: SongArgs,

    /// Timestamp in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Render job request JSON.
    #[arg(long)]
    request: PathBuf,

    /// Audio track muxed into the video.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Output video path; `pixbeat_<template>.mp4` in the request's directory hint by default.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Worker threads (all cores by default).
    #[arg(long)]
    threads: Option<usize>,

    /// Override the request seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for intermediate frames.
    #[arg(long)]
    work_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Events(args) => cmd_events(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_context(song: &SongArgs) -> anyhow::Result<pixbeat::RenderJobContext> {
    let features = pixbeat::AudioFeatures::from_path(&song.features)?;
    let timeline = pixbeat::Timeline::from_features(&features)?;
    let style = pixbeat::VisualStyle::from_template_id(&song.template)?;
    let mut settings = match &song.settings {
        Some(path) => pixbeat::ProjectSettings::from_path(path)?,
        None => pixbeat::ProjectSettings::default(),
    };
    if let Some(seed) = song.seed {
        settings.seed = seed;
    }
    Ok(pixbeat::RenderJobContext::new(timeline, style, settings)?)
}

fn cmd_events(args: EventsArgs) -> anyhow::Result<()> {
    let ctx = load_context(&args.song)?;
    let json = serde_json::to_string_pretty(ctx.events().as_slice())
        .context("serialize graphics events")?;
    println!("{json}");
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let ctx = load_context(&args.song)?;
    let frame = pixbeat::render_frame_at(&ctx, args.time)?;
    create_parent(&args.out)?;
    frame.write_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    if !pixbeat::is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for video rendering, but was not found on PATH");
    }

    let mut request = pixbeat::RenderJobRequest::from_path(&args.request)?;
    if let Some(seed) = args.seed {
        request.settings.seed = seed;
    }
    if let Some(threads) = args.threads {
        request.settings.threads = Some(threads);
    }

    let mut job = pixbeat::RenderJob::new(request);
    if let Some(audio) = args.audio {
        job = job.with_audio(audio);
    }
    if let Some(out) = args.out {
        job = job.with_output(out);
    }
    if let Some(dir) = args.work_dir {
        job = job.with_work_dir(dir);
    }

    let encoder = pixbeat::FfmpegEncoder::new();
    let cancel = pixbeat::CancellationToken::new();
    match job.run(&encoder, &cancel, &pixbeat::LogProgress)? {
        pixbeat::JobOutcome::Completed { output, stats } => {
            eprintln!(
                "wrote {} ({} frames in {:.1}s)",
                output.display(),
                stats.frames,
                stats.total_elapsed.as_secs_f64()
            );
        }
        pixbeat::JobOutcome::Cancelled => eprintln!("cancelled"),
    }
    Ok(())
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
