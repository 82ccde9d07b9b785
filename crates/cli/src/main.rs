//! CLI application for the MEV Radar detection service.

mod server;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mev_radar_heuristics::{DetectionEngine, EngineConfig};
use mev_radar_telemetry::{init_logging, LogFormat, Metrics};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::server::AppState;

#[derive(Parser)]
#[command(name = "mev-radar")]
#[command(about = "Scores Ethereum transactions for MEV activity")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the detection HTTP service
    Serve {
        /// Address to bind the HTTP server to
        #[arg(long, default_value = "0.0.0.0:5001")]
        bind_address: String,

        /// Log level
        #[arg(long)]
        log_level: Option<String>,

        /// Log format (json or pretty)
        #[arg(long, default_value = "json")]
        log_format: String,

        /// CSV of known MEV bot addresses merged into the defaults
        #[arg(long)]
        known_bots_csv: Option<String>,

        /// Sample output path for audit logs
        #[arg(long)]
        sample_output_path: Option<String>,

        /// Number of recent transactions kept for correlation
        #[arg(long, default_value = "1000")]
        max_cache_size: usize,

        /// Window in seconds for rapid-fire sender detection
        #[arg(long, default_value = "60")]
        timing_window_seconds: u64,
    },
    /// Analyze transactions from a JSON file and print verdicts
    Analyze {
        /// File holding one transaction object or an array of them
        #[arg(long)]
        input: PathBuf,

        /// CSV of known MEV bot addresses merged into the defaults
        #[arg(long)]
        known_bots_csv: Option<String>,

        /// Log level
        #[arg(long, default_value = "warn")]
        log_level: String,
    },
    /// Validate a known MEV bots CSV
    ImportBots {
        /// Known MEV bots CSV path
        #[arg(long)]
        known_bots_csv: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind_address,
            log_level,
            log_format,
            known_bots_csv,
            sample_output_path,
            max_cache_size,
            timing_window_seconds,
        } => {
            init_logging(log_level.as_deref(), log_format.parse::<LogFormat>()?)?;
            let config = EngineConfig {
                max_cache_size,
                timing_window_secs: timing_window_seconds,
            };
            run_server(
                &bind_address,
                config,
                known_bots_csv.as_deref(),
                sample_output_path,
            )
            .await?;
        }
        Commands::Analyze {
            input,
            known_bots_csv,
            log_level,
        } => {
            init_logging(Some(log_level.as_str()), LogFormat::Pretty)?;
            analyze_file(&input, known_bots_csv.as_deref())?;
        }
        Commands::ImportBots { known_bots_csv } => {
            init_logging(None, LogFormat::Pretty)?;
            let addresses = load_known_bots(&known_bots_csv)?;
            let distinct: std::collections::HashSet<String> =
                addresses.iter().map(|a| a.to_lowercase()).collect();
            info!(
                "{} contains {} rows, {} distinct addresses",
                known_bots_csv,
                addresses.len(),
                distinct.len()
            );
        }
    }

    Ok(())
}

async fn run_server(
    bind_address: &str,
    config: EngineConfig,
    known_bots_csv: Option<&str>,
    sample_output_path: Option<String>,
) -> anyhow::Result<()> {
    info!("Starting MEV Radar detection service");

    let engine = DetectionEngine::new(config);
    merge_known_bots(&engine, known_bots_csv)?;

    let metrics = Metrics::new()?;
    metrics.set_known_bots(engine.known_bot_count()?);
    info!(
        "Loaded {} known MEV bots and {} DEX routers",
        engine.known_bot_count()?,
        engine.dex_router_count()?
    );

    let state = AppState {
        engine: Arc::new(engine),
        metrics,
        sample_output_path: sample_output_path.map(|p| Arc::new(PathBuf::from(p))),
    };

    server::serve(bind_address, state).await
}

fn analyze_file(input: &Path, known_bots_csv: Option<&str>) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(input)?;
    let raw: Value = serde_json::from_str(&contents)?;
    let transactions = match raw {
        Value::Array(items) => items,
        single => vec![single],
    };

    let engine = DetectionEngine::default();
    merge_known_bots(&engine, known_bots_csv)?;

    for tx in &transactions {
        let verdict = engine.analyze_json(tx);
        println!("{}", serde_json::to_string(&verdict)?);
    }

    info!("Analyzed {} transactions from {:?}", transactions.len(), input);
    Ok(())
}

/// Merge a known-bots CSV into the engine when the file exists.
fn merge_known_bots(engine: &DetectionEngine, csv_path: Option<&str>) -> anyhow::Result<()> {
    let Some(path) = csv_path else {
        return Ok(());
    };

    if !Path::new(path).exists() {
        warn!("Known bots CSV not found at {}, continuing with defaults", path);
        return Ok(());
    }

    let addresses = load_known_bots(path)?;
    let total = engine.update_known_bots(&addresses)?;
    info!("Imported {} bot addresses from {}, {} known in total", addresses.len(), path, total);
    Ok(())
}

/// Read the `address` column of a known-bots CSV.
fn load_known_bots(csv_path: &str) -> anyhow::Result<Vec<String>> {
    info!("Reading known MEV bots from {}", csv_path);

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut addresses = Vec::new();
    for result in reader.deserialize() {
        let record: BotRecord = result?;
        if let Some(label) = &record.label {
            debug!("Known bot {} ({})", record.address, label);
        }
        addresses.push(record.address);
    }

    Ok(addresses)
}

#[derive(serde::Deserialize)]
struct BotRecord {
    address: String,
    label: Option<String>,
}
