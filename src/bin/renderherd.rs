use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use renderherd::{
    AlwaysReady, BasicResolver, EncoderSettings, HttpNotifier, MovieQuality, PrerenderedPipeline,
    RenderExecutor, SessionConfig,
};

#[derive(Parser, Debug)]
#[command(name = "renderherd", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode an already-rendered frame sequence and report job progress
    /// to the coordinator.
    Run(RunArgs),
    /// Validate encoder settings and probe the encoder binary.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Coordinator job id.
    #[arg(long)]
    job_id: String,

    /// Level-sequence path this job renders.
    #[arg(long)]
    level_sequence: PathBuf,

    /// Movie quality index: 0=24fps, 1=30fps, 2=60fps, 3=120fps.
    #[arg(long, default_value_t = 3)]
    movie_quality: u8,

    /// Movie filename format. Tokens: {sequence_name}, {render_pass},
    /// {shot_name}, {camera_name}, {version}.
    #[arg(long, default_value = "")]
    movie_format: String,

    /// Directory holding the rendered frames (plus any .wav mix).
    #[arg(long)]
    frames_dir: PathBuf,

    /// Render pass name assigned to the frames.
    #[arg(long, default_value = "beauty")]
    render_pass: String,

    /// Coordinator base URL.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    coordinator_url: String,

    /// Root directory output is created under.
    #[arg(long, default_value = "Saved")]
    saved_root: PathBuf,

    /// Encoder settings JSON; built-in ffmpeg defaults when omitted.
    #[arg(long)]
    encoder_settings: Option<PathBuf>,

    /// Keep generated input manifests on disk for debugging.
    #[arg(long, default_value_t = false)]
    preserve_manifests: bool,

    /// Delete the source frames once their encode finishes.
    #[arg(long, default_value_t = false)]
    delete_source_files: bool,

    /// Tick interval in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Encoder settings JSON; built-in ffmpeg defaults when omitted.
    #[arg(long)]
    encoder_settings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<EncoderSettings> {
    match path {
        Some(path) => Ok(EncoderSettings::from_path(path)?),
        None => Ok(EncoderSettings::default()),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let quality = MovieQuality::from_index(args.movie_quality)
        .with_context(|| format!("movie quality index {} out of range 0-3", args.movie_quality))?;

    let mut config = SessionConfig::new(args.job_id, &args.level_sequence, quality);
    config.movie_format = args.movie_format;
    config.coordinator_url = args.coordinator_url;
    config.saved_root = args.saved_root;
    config.encoder = load_settings(args.encoder_settings.as_ref())?;
    config.preserve_manifests = args.preserve_manifests;
    config.delete_source_files = args.delete_source_files;

    let pipeline = PrerenderedPipeline::from_frames_dir(
        &args.frames_dir,
        &args.render_pass,
        &config.sequence_name(),
    )?;

    let notifier = HttpNotifier::new(config.coordinator_url.clone());
    let tick_interval = Duration::from_millis(args.tick_ms.max(1));
    let output_dir = config.render_output_dir();

    let mut executor = RenderExecutor::new(
        config,
        pipeline,
        Box::new(AlwaysReady),
        Box::new(BasicResolver::default()),
        Instant::now(),
    )?;

    while !executor.is_finished() {
        executor.tick(&notifier, Instant::now());
        std::thread::sleep(tick_interval);
    }

    // Let every queued notification reach the coordinator before exit.
    notifier.flush();

    eprintln!("wrote {}", output_dir.display());
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.encoder_settings.as_ref())?;

    let errors = settings.validation_errors();
    for error in &errors {
        tracing::error!("{error}");
    }
    if !errors.is_empty() {
        anyhow::bail!("encoder settings are incomplete ({} problems)", errors.len());
    }

    if !settings.is_encoder_available() {
        anyhow::bail!(
            "encoder '{}' did not respond to -version; is it installed and on PATH?",
            settings.executable_path
        );
    }

    eprintln!("encoder '{}' looks usable", settings.executable_path);
    Ok(())
}
