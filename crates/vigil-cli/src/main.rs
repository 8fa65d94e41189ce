use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use vigil_core::{
    replay, score, EventRecord, Report, SessionMeta, TickScript, VigilConfig, VigilError,
    VigilResult,
};
use vigil_signals::AudioFrame;

#[derive(Parser)]
#[command(name = "vigil", about = "Proctoring event scoring, reports and replays")]
struct Cli {
    /// Config file layered over the built-in defaults (VIGIL_* env overrides apply last)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Integrity score of a JSON array of event records
    Score {
        events: PathBuf,
        /// Window start, µs since epoch (unbounded when omitted)
        #[arg(long)]
        start_us: Option<i64>,
        /// Window end, µs since epoch (open when omitted)
        #[arg(long)]
        end_us: Option<i64>,
    },
    /// Build a report from `{ "session": {...}, "events": [...] }`
    Report { session: PathBuf },
    /// Run a recorded tick script through a fresh engine
    Replay {
        script: PathBuf,
        /// Print only the emitted events
        #[arg(long)]
        events_only: bool,
    },
    /// Loudness features of a JSON array of PCM samples
    Features {
        samples: PathBuf,
        #[arg(long, default_value_t = 48_000.0)]
        sample_rate: f32,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Deserialize)]
struct SessionDump {
    session: SessionMeta,
    #[serde(default)]
    events: Vec<EventRecord>,
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["vigil_core=info", "vigil_detectors=info"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(path: Option<&Path>) -> VigilResult<VigilConfig> {
    let config = VigilConfig::load_layered(None, path)?;
    if let Some(p) = path {
        if !p.exists() {
            warn!("Config file {} not found, using defaults", p.display());
        }
    }
    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> VigilResult<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Score the events inside the window; either bound may be omitted.
fn windowed_score(events: &[EventRecord], start_us: Option<i64>, end_us: Option<i64>) -> u8 {
    score(events, start_us.unwrap_or(i64::MIN), end_us)
}

fn main() -> VigilResult<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Score {
            events,
            start_us,
            end_us,
        } => {
            let events: Vec<EventRecord> = read_json(&events)?;
            let s = windowed_score(&events, start_us, end_us);
            info!("Scored {} events", events.len());
            println!("{}", s);
        }
        Commands::Report { session } => {
            let dump: SessionDump = read_json(&session)?;
            let report = Report::build(&dump.session, &dump.events);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Replay {
            script,
            events_only,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let script: TickScript = read_json(&script)?;
            let outcome = replay(&script, config);
            if events_only {
                println!("{}", serde_json::to_string_pretty(&outcome.events)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
        }
        Commands::Features {
            samples,
            sample_rate,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let samples: Vec<f32> = read_json(&samples)?;
            if samples.is_empty() {
                return Err(VigilError::Input("sample buffer is empty".to_string()));
            }
            let frame =
                AudioFrame::from_samples_in_band(samples, sample_rate, &config.audio.speech_band());
            let features = frame.features(config.audio.band_low_hz, config.audio.band_high_hz);
            println!(
                "rms={:.6} band_db={:.2} bin_hz={:.3}",
                features.rms,
                features.band_db,
                frame.bin_hz()
            );
        }
        Commands::Config => {
            let config = load_config(cli.config.as_deref())?;
            print!("{}", config.to_toml_string()?);
        }
    }
    Ok(())
}
