use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chalkline", version, about = "Whiteboard hand-drawing video renderer")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render every frame as a numbered PNG.
    Frames(FramesArgs),
    /// Render the finished state of one scene as a PNG.
    Still(StillArgs),
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Input project JSON. Asset paths are resolved relative to its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Render scenes concurrently.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Fail instead of overwriting an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// x264 constant rate factor.
    #[arg(long, default_value_t = 18)]
    crf: u8,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Directory receiving `frame_000000.png`, `frame_000001.png`, ...
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct StillArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scene index (0-based).
    #[arg(long, default_value_t = 0)]
    scene: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Still(args) => cmd_still(args),
    }
}

fn assets_root(in_path: &Path) -> &Path {
    in_path.parent().unwrap_or_else(|| Path::new("."))
}

fn load_project(in_path: &Path) -> anyhow::Result<chalkline::Project> {
    let project = chalkline::Project::from_path(in_path)?;
    project.validate()?;
    Ok(project)
}

fn session_opts(args: &SessionArgs) -> chalkline::RenderSessionOpts {
    chalkline::RenderSessionOpts {
        parallel: args.parallel,
        threads: args.threads,
        spool_dir: None,
    }
}

fn finish(report: &chalkline::RenderReport, wrote: &Path) -> anyhow::Result<()> {
    for failure in &report.failures {
        eprintln!("scene {} failed: {}", failure.index, failure.error);
    }
    eprintln!(
        "wrote {} ({} frames, {} scenes)",
        wrote.display(),
        report.frames_written,
        report.scenes.len()
    );
    if !report.is_complete() {
        anyhow::bail!("{} scene(s) failed", report.failures.len());
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let project = load_project(&args.session.in_path)?;
    if !chalkline::encode::ffmpeg::is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for MP4 rendering, but was not found on PATH");
    }
    let session = chalkline::RenderSession::new(
        &project,
        assets_root(&args.session.in_path),
        session_opts(&args.session),
    )?;

    let mut sink = chalkline::FfmpegSink::new(chalkline::FfmpegSinkOpts {
        out_path: args.out.clone(),
        overwrite: !args.no_overwrite,
        crf: args.crf,
    });
    let report = session.render(&mut sink)?;
    finish(&report, &args.out)
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let project = load_project(&args.session.in_path)?;
    let session = chalkline::RenderSession::new(
        &project,
        assets_root(&args.session.in_path),
        session_opts(&args.session),
    )?;

    let mut sink = chalkline::PngSequenceSink::new(&args.out_dir);
    let report = session.render(&mut sink)?;
    finish(&report, &args.out_dir)
}

fn cmd_still(args: StillArgs) -> anyhow::Result<()> {
    let project = load_project(&args.in_path)?;
    let session = chalkline::RenderSession::new(
        &project,
        assets_root(&args.in_path),
        chalkline::RenderSessionOpts::default(),
    )?;
    let frame = session.still(args.scene)?;

    chalkline::encode::ffmpeg::ensure_parent_dir(&args.out)?;
    frame
        .into_image()?
        .save(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
