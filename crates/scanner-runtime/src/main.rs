//! # nonce-scan
//!
//! Scans a chain for ECDSA signatures that reuse a nonce (the same R value)
//! and reports every reuse as one JSON object per line on stdout.
//!
//! ```text
//! nonce-scan [-c scan.toml] [scan [--stop-height H]]
//! nonce-scan [-c scan.toml] collisions [--json]
//! ```
//!
//! Exit codes: `0` finished, `1` fatal run error, `2` configuration error,
//! `130` interrupted.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ns_02_collision_store::CollisionStore;
use ns_03_scan_loop::JsonLinesReportSink;
use scanner_runtime::{
    collision_listings, error_class, exit_code, failure_exit_code, run_scan, write_collisions,
    BitcoindRpcSource, ConfigError, RocksDbStore, RunOutcome, ScannerConfig,
};
use shared_types::ErrorClass;

const DEFAULT_CONFIG_PATH: &str = "scan.toml";

#[derive(Debug, Parser)]
#[command(name = "nonce-scan", version, about = "ECDSA nonce-reuse scanner")]
struct Cli {
    /// Configuration file [default: scan.toml when present]
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan from the stored cursor to the chain tip (default)
    Scan {
        /// Stop after this height even if the tip is higher
        #[arg(long, value_name = "HEIGHT")]
        stop_height: Option<u64>,
    },
    /// List every reused R value in the store
    Collisions {
        /// One JSON object per R value instead of text
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// An explicit `--config` must exist; the default file is optional.
fn load_config(path: Option<&Path>) -> Result<ScannerConfig, ConfigError> {
    match path {
        Some(path) => ScannerConfig::load(Some(path)),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                ScannerConfig::load(Some(default))
            } else {
                info!("[runtime] No {} found, using defaults and environment", DEFAULT_CONFIG_PATH);
                ScannerConfig::load(None)
            }
        }
    }
}

async fn scan(mut config: ScannerConfig, stop_height: Option<u64>) -> Result<RunOutcome> {
    if stop_height.is_some() {
        config.scan.stop_height = stop_height;
    }
    config.validate()?;
    let source = BitcoindRpcSource::new(&config.rpc)?;
    info!("[runtime] Node endpoint {}", source.endpoint());

    let kv = RocksDbStore::open(config.storage.rocksdb_config())
        .context("opening signature store")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("[runtime] Interrupt received, finishing committed heights");
            let _ = shutdown_tx.send(true);
        }
    });

    let summary = run_scan(
        source,
        kv,
        &config.scan,
        JsonLinesReportSink::stdout(),
        shutdown_rx,
    )
    .await?;

    info!(
        "[runtime] Heights {}..={}: {} transactions, {} signatures, {} rejected candidates, {} script errors",
        summary.start_height,
        summary.target_height,
        summary.extraction.transactions,
        summary.extraction.signatures,
        summary.extraction.rejected_candidates,
        summary.extraction.script_errors
    );
    Ok(RunOutcome::from(&summary))
}

fn collisions(config: ScannerConfig, json: bool) -> Result<RunOutcome> {
    let kv = RocksDbStore::open(config.storage.rocksdb_config())
        .context("opening signature store")?;
    let store = CollisionStore::open(kv)?;
    let listings = collision_listings(&store)?;
    info!("[runtime] {} reused R values", listings.len());

    let stdout = std::io::stdout();
    write_collisions(&listings, json, &mut stdout.lock()).context("writing collisions")?;
    Ok(RunOutcome::Completed)
}

async fn run(cli: Cli) -> Result<RunOutcome> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command.unwrap_or(Command::Scan { stop_height: None }) {
        Command::Scan { stop_height } => scan(config, stop_height).await,
        Command::Collisions { json } => collisions(config, json),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing() {
        eprintln!("failed to initialise logging: {e}");
        return ExitCode::from(exit_code::FATAL);
    }

    let code = match run(cli).await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            let class = error_class(&e);
            match class {
                ErrorClass::Configuration => error!("[runtime] Configuration error: {:#}", e),
                _ => error!("[runtime] Scan failed ({}): {:#}", class, e),
            }
            failure_exit_code(class)
        }
    };
    ExitCode::from(code)
}
