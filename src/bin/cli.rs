//! cadenza CLI: offline WAV rendering and headless live sessions.
//!
//! Usage:
//!   cz-cli render --preset calm --duration 20 --out calm.wav
//!   cz-cli render --params piece.json --changes schedule.json --seed 7
//!   cz-cli live --preset sad --seconds 12 --switch-to energetic --transition 3
//!   cz-cli presets

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use cz_master::{
    samples_to_wav, Controller, LiveConfig, MusicParameters, ParameterChange, Preset, RenderConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cz-cli")]
#[command(about = "Procedural music generator: render to WAV or run a live stream")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a piece offline and write it as 16-bit mono WAV
    Render(RenderArgs),
    /// Run a live stream for a while, optionally switching presets mid-run
    Live(LiveArgs),
    /// List the built-in presets
    Presets,
}

#[derive(Args, Debug)]
struct PieceArgs {
    /// Preset to start from
    #[arg(long, short, default_value = "happy")]
    preset: String,

    /// JSON file with a full parameter set; overrides --preset
    #[arg(long, value_name = "JSON")]
    params: Option<PathBuf>,

    /// Tempo in beats per minute
    #[arg(long)]
    tempo: Option<f32>,

    /// Master volume, 0.0 to 1.0
    #[arg(long)]
    volume: Option<f32>,

    /// Generator seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 44_100)]
    sample_rate: u32,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    piece: PieceArgs,

    /// Length in seconds
    #[arg(long)]
    duration: Option<f64>,

    /// JSON file with a list of parameter changes
    #[arg(long, value_name = "JSON")]
    changes: Option<PathBuf>,

    /// Output WAV path
    #[arg(long, short, default_value = "cadenza.wav")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct LiveArgs {
    #[command(flatten)]
    piece: PieceArgs,

    /// How long to run, in seconds of delivered audio
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    /// Preset to move to halfway through
    #[arg(long, value_name = "PRESET")]
    switch_to: Option<String>,

    /// Transition length for --switch-to, in seconds
    #[arg(long, default_value_t = 2.0)]
    transition: f64,

    /// Also capture the delivered stream to this WAV file
    #[arg(long, short)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Render(args) => render(args),
        Command::Live(args) => live(args),
        Command::Presets => {
            for preset in Preset::ALL {
                let p = preset.parameters();
                println!(
                    "{:<10} {:>5} bpm  {:?}/{:?}  melody {:?}, harmony {:?}",
                    preset.name(),
                    p.tempo,
                    p.mood,
                    p.scale,
                    p.melody_pattern,
                    p.harmony_pattern
                );
            }
            Ok(())
        }
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let mut params = piece_parameters(&args.piece)?;
    if let Some(duration) = args.duration {
        params.duration = duration;
    }
    let changes = match &args.changes {
        Some(path) => load_changes(path)?,
        None => Vec::new(),
    };

    let render = RenderConfig { sample_rate: args.piece.sample_rate, seed: args.piece.seed };
    let mut ctrl = Controller::new(render, LiveConfig::default())?;

    info!(
        tempo = params.tempo,
        mood = ?params.mood,
        duration = params.duration,
        changes = changes.len(),
        "rendering"
    );
    let started = Instant::now();
    let wav = ctrl.render_to_wav(&params, &changes)?;
    fs::write(&args.out, &wav).with_context(|| format!("failed to write {}", args.out.display()))?;
    info!(
        path = %args.out.display(),
        bytes = wav.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "wrote wav"
    );
    Ok(())
}

fn live(args: LiveArgs) -> Result<()> {
    let params = piece_parameters(&args.piece)?;
    let switch_to = args.switch_to.as_deref().map(preset).transpose()?;

    let live_config = LiveConfig {
        sample_rate: args.piece.sample_rate,
        seed: args.piece.seed,
        ..LiveConfig::default()
    };
    let block = live_config.block_size;
    let block_time = Duration::from_secs_f64(block as f64 / live_config.sample_rate as f64);
    let render = RenderConfig { sample_rate: args.piece.sample_rate, seed: args.piece.seed };
    let mut ctrl = Controller::new(render, live_config)?;

    ctrl.start_live(params)?;
    let mut captured = Vec::new();
    let mut switched = false;
    let mut last_report = 0.0;

    loop {
        let Some(stream) = ctrl.live_mut() else {
            break;
        };
        let now = stream.current_time_seconds();
        if now >= args.seconds {
            break;
        }
        let samples = stream.read(block);
        if args.out.is_some() {
            captured.extend_from_slice(&samples);
        }

        if let Some(target) = switch_to.filter(|_| !switched && now >= args.seconds / 2.0) {
            info!(preset = target.name(), transition = args.transition, "switching");
            ctrl.update_live(target.parameters(), args.transition)?;
            switched = true;
        }
        if now - last_report >= 1.0 {
            if let Some(stream) = ctrl.live() {
                let e = stream.effective_parameters();
                info!(
                    time = %format!("{:.1}", now),
                    tempo = %format!("{:.1}", e.tempo),
                    mood = ?e.mood,
                    buffered = stream.buffered(),
                    "live"
                );
            }
            last_report = now;
        }
        std::thread::sleep(block_time);
    }

    ctrl.stop_live()?;
    if let Some(path) = &args.out {
        fs::write(path, samples_to_wav(&captured, args.piece.sample_rate))
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), samples = captured.len(), "wrote capture");
    }
    Ok(())
}

fn piece_parameters(args: &PieceArgs) -> Result<MusicParameters> {
    let mut params = match &args.params {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("invalid parameters in {}", path.display()))?
        }
        None => preset(&args.preset)?.parameters(),
    };
    if let Some(tempo) = args.tempo {
        params.tempo = tempo;
    }
    if let Some(volume) = args.volume {
        params.volume = volume;
    }
    Ok(params)
}

fn preset(name: &str) -> Result<Preset> {
    Preset::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
        anyhow!("unknown preset '{}', expected one of: {}", name, names.join(", "))
    })
}

fn load_changes(path: &Path) -> Result<Vec<ParameterChange>> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid change list in {}", path.display()))
}
