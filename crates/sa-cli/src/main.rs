mod analyser;
mod settings;
mod synth;

use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use sa_core::clock::now_unix_ms;
use sa_core::{
    EngineConfig, ManualClock, Session, Snapshot, SpectrumFrame, export_json, frame_from_json,
    frame_to_json,
};

use crate::analyser::WavFrames;
use crate::synth::SynthParams;

#[derive(Parser)]
#[command(name = "sa", about = "Spectral attention engine driver")]
struct Cli {
    /// Engine configuration file (TOML); falls back to $SA_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run frames through a session and print one snapshot per frame
    Run(RunArgs),

    /// Write synthetic harmonic frames as JSON lines
    Synth {
        /// Fundamental frequency in Hz
        #[arg(long, default_value_t = 220.0)]
        fundamental: f64,

        /// Number of partials including the fundamental
        #[arg(long, default_value_t = 5)]
        harmonics: usize,

        /// Byte magnitude of each partial
        #[arg(long, default_value_t = 255)]
        magnitude: u8,

        /// Number of frames to emit
        #[arg(long, default_value_t = 60)]
        frames: usize,

        /// Peak of the uniform noise floor (0 = none)
        #[arg(long, default_value_t = 0)]
        noise: u8,

        /// Toggle the tone every N frames (0 = steady)
        #[arg(long, default_value_t = 0)]
        pulse: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args)]
struct RunArgs {
    /// JSON-lines frame file ("-" or omitted reads stdin)
    #[arg(long, conflicts_with = "wav")]
    input: Option<PathBuf>,

    /// Analyse a WAV file instead of reading frames
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Clock advance per frame in milliseconds (JSON input only)
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    interval_ms: f64,

    /// Print every Nth snapshot
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    every: u64,

    /// Print a one-line summary instead of the JSON snapshot
    #[arg(long)]
    summary: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = settings::config_path(cli.config.as_deref());
    let config = settings::load_config(config_path.as_deref())?;

    match &cli.command {
        Commands::Run(args) => cmd_run(config, args),
        Commands::Synth {
            fundamental,
            harmonics,
            magnitude,
            frames,
            noise,
            pulse,
            seed,
        } => cmd_synth(
            &config,
            &SynthParams {
                fundamental: *fundamental,
                harmonics: *harmonics,
                magnitude: *magnitude,
                noise: *noise,
                pulse: *pulse,
                seed: *seed,
            },
            *frames,
        ),
        Commands::Config => cmd_config(&config),
    }
}

fn cmd_run(mut config: EngineConfig, args: &RunArgs) -> Result<()> {
    let frames: Box<dyn Iterator<Item = Result<SpectrumFrame>>>;
    let interval_ms;
    match &args.wav {
        Some(path) => {
            let wav = WavFrames::open(path, config.fft_size)?;
            let rate = wav.sample_rate() as f64;
            if rate != config.sample_rate {
                tracing::info!(
                    "using the file's sample rate {rate} Hz instead of {} Hz",
                    config.sample_rate
                );
                for def in config.fit_sample_rate(rate) {
                    tracing::warn!(
                        "channel {} ({}) starts above the {} Hz Nyquist limit, skipped",
                        def.id,
                        def.label,
                        rate / 2.0
                    );
                }
                config
                    .validate()
                    .context("configuration does not fit the file's sample rate")?;
            }
            interval_ms = wav.interval_ms();
            frames = Box::new(wav.map(Ok));
        }
        None => {
            interval_ms = args.interval_ms;
            frames = json_frames(args.input.as_deref())?;
        }
    }

    let mut session = Session::with_clock(config, ManualClock::new(now_unix_ms()))
        .context("failed to start session")?;
    tracing::info!(
        session = %session.snapshot().session_id,
        "session started"
    );

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for (n, frame) in frames.enumerate() {
        let frame = frame?;
        session.clock().advance_ms(interval_ms);
        let snap = session
            .step(&frame)
            .with_context(|| format!("frame {} rejected", n + 1))?;

        if snap.frame % args.every == 0 {
            if args.summary {
                writeln!(out, "{}", summary_line(snap))?;
            } else {
                writeln!(out, "{}", export_json(snap).context("failed to serialize snapshot")?)?;
            }
        }
    }
    out.flush()?;

    tracing::info!(frames = session.frames_processed(), "run complete");
    Ok(())
}

/// Frames from a JSON-lines file or stdin. Blank lines are skipped.
fn json_frames(path: Option<&Path>) -> Result<Box<dyn Iterator<Item = Result<SpectrumFrame>>>> {
    let reader: Box<dyn BufRead> = match path {
        Some(p) if p != Path::new("-") => {
            let file = std::fs::File::open(p)
                .with_context(|| format!("failed to open {}", p.display()))?;
            Box::new(std::io::BufReader::new(file))
        }
        _ => Box::new(std::io::stdin().lock()),
    };

    let iter = reader
        .lines()
        .enumerate()
        .filter_map(|(i, line)| match line {
            Ok(l) if l.trim().is_empty() => None,
            Ok(l) => Some(
                frame_from_json(&l).with_context(|| format!("line {}: invalid frame", i + 1)),
            ),
            Err(e) => Some(Err(anyhow::Error::new(e).context("failed to read input"))),
        });
    Ok(Box::new(iter))
}

fn summary_line(snap: &Snapshot) -> String {
    let h = &snap.harmony;
    let focus = snap.focus().map(|c| c.label.as_str()).unwrap_or("-");
    let active: Vec<&str> = snap.active_channels().map(|c| c.label.as_str()).collect();
    format!(
        "frame {:>5}  pitch {:>7.1} Hz  consonance {:.3}  tension {:.3}  resolution {:.2}  focus {}  active [{}]",
        snap.frame,
        h.pitch,
        h.consonance,
        h.tension,
        h.resolution,
        focus,
        active.join(", ")
    )
}

fn cmd_synth(config: &EngineConfig, params: &SynthParams, count: usize) -> Result<()> {
    if params.fundamental <= 0.0 || params.fundamental >= config.sample_rate / 2.0 {
        bail!(
            "fundamental {} Hz is outside (0, {}) Hz",
            params.fundamental,
            config.sample_rate / 2.0
        );
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for frame in synth::frames(config, params, count) {
        writeln!(out, "{}", frame_to_json(&frame).context("failed to serialize frame")?)?;
    }
    out.flush()?;
    Ok(())
}

fn cmd_config(config: &EngineConfig) -> Result<()> {
    print!("{}", settings::to_toml(config)?);
    Ok(())
}
