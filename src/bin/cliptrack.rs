use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cliptrack", version)]
struct Cli {
    /// Engine configuration JSON.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured frame rate.
    #[arg(long, global = true)]
    fps: Option<f64>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print frame-level timeline diagnostics for a project.
    Inspect(InspectArgs),
    /// Print what is on screen at a given time.
    Playback(PlaybackArgs),
    /// Upgrade a project document to the current schema.
    Migrate(MigrateArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PlaybackArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timeline time in seconds.
    #[arg(long)]
    time: f64,
}

#[derive(Parser, Debug)]
struct MigrateArgs {
    /// Input project JSON, any schema version.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path for the upgraded document.
    #[arg(long)]
    out: PathBuf,

    /// Project name to store; defaults to the one in the document.
    #[arg(long)]
    name: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.fps)?;
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(&config, args),
        Command::Playback(args) => cmd_playback(&config, args),
        Command::Migrate(args) => cmd_migrate(args),
    }
}

fn load_config(path: Option<&Path>, fps: Option<f64>) -> anyhow::Result<cliptrack::EngineConfig> {
    let mut config = match path {
        Some(p) => cliptrack::EngineConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => cliptrack::EngineConfig::default(),
    };
    if let Some(fps) = fps {
        config.fps = fps;
        config.validate().context("validate --fps")?;
    }
    Ok(config)
}

fn fallback_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| cliptrack::UNTITLED_PROJECT.to_string())
}

fn read_project(path: &Path) -> anyhow::Result<cliptrack::ProjectDocument> {
    cliptrack::ProjectDocument::from_path(path, &fallback_name(path))
        .with_context(|| format!("read project '{}'", path.display()))
}

fn load_editor(
    config: &cliptrack::EngineConfig,
    path: &Path,
) -> anyhow::Result<cliptrack::TimelineEditor> {
    let doc = read_project(path)?;
    let mut editor = cliptrack::TimelineEditor::new(config.clone());
    editor.load_flat(&doc.flat_state());
    tracing::info!(
        project = %editor.state().project_name,
        clips = editor.clips().count(),
        duration = editor.duration(),
        "project loaded"
    );
    Ok(editor)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).context("write JSON to stdout")?;
    writeln!(out)?;
    Ok(())
}

fn cmd_inspect(config: &cliptrack::EngineConfig, args: InspectArgs) -> anyhow::Result<()> {
    let editor = load_editor(config, &args.in_path)?;
    let diagnostics =
        cliptrack::build_timeline_diagnostics(&editor.state().tracks, config.fps, None, None);
    print_json(&diagnostics)
}

fn cmd_playback(config: &cliptrack::EngineConfig, args: PlaybackArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.time.is_finite(), "--time must be finite");
    let editor = load_editor(config, &args.in_path)?;
    let playback = cliptrack::playback_at(editor.state(), config.fps, args.time.max(0.0), &[]);
    print_json(&playback)
}

fn cmd_migrate(args: MigrateArgs) -> anyhow::Result<()> {
    let doc = read_project(&args.in_path)?;
    let doc = match args.name {
        Some(name) => {
            let flat = doc.flat_state();
            cliptrack::build_persisted_onto(&doc, &flat, &name, &doc.output_settings)
        }
        None => doc,
    };

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let file = std::fs::File::create(&args.out)
        .with_context(|| format!("create '{}'", args.out.display()))?;
    doc.to_writer_pretty(file)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
