//! boxbreath - terminal box-breathing timer
//!
//! Run with: cargo run -- --log boxbreath.log

mod app;
mod output;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::App;
use boxbreath::{AudioSettings, BreathingSession};

#[derive(Parser, Debug)]
#[command(name = "boxbreath")]
#[command(version, about = "Inhale, hold, exhale, hold: four seconds each, with sound", long_about = None)]
struct Args {
    /// Ambient drone volume, 0-100
    #[arg(long, default_value_t = 50.0)]
    ambient_volume: f32,

    /// Cue volume, 0-100
    #[arg(long, default_value_t = 80.0)]
    cues_volume: f32,

    /// Start with sound muted
    #[arg(long)]
    muted: bool,

    /// Never open an audio device
    #[arg(long)]
    no_audio: bool,

    /// Write logs to this file (the terminal is taken by the UI)
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(path) = &args.log {
        init_logging(path)?;
    }

    let settings = AudioSettings::new()
        .with_ambient_volume(args.ambient_volume)
        .with_cues_volume(args.cues_volume)
        .with_sound_enabled(!args.muted);

    let mut app = App::new(BreathingSession::new(settings), !args.no_audio);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    app.shutdown();
    result
}

fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;

    // Honor `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    Ok(())
}
