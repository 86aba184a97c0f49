//! # Metrics Tracker Collector - Main Entry Point
//!
//! 1. Loads the layered collector configuration
//! 2. Creates the data and parquet directories
//! 3. Runs a collection cycle immediately, then at every scheduled time of day
//! 4. Exits on Ctrl-C

use clap::Parser;
use color_eyre::Result;
use metrics_tracker_collector::{
    scheduler,
    Orchestrator,
};
use metrics_tracker_config::CollectorConfig;
use std::{
    path::PathBuf,
    sync::Arc,
};
use tracing::info;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "metrics-tracker-collector")]
#[command(about = "Collects community and repository metrics on a schedule")]
#[command(version)]
struct Cli {
    /// Path to a collector config file (yaml), replacing `collector.yaml` in the config directory
    #[arg(long, env = "METRICS_TRACKER_COLLECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter))
        .with(tracing_error::ErrorLayer::default())
        .try_init()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = CollectorConfig::new(cli.config.as_deref())?;
    let cadence = config.cadence()?;
    info!("Starting Metrics Tracker Collector");
    info!("Data directory: {}", config.data_dir.display());
    info!("Schedule: {}", config.schedule.join(", "));

    let orchestrator = Orchestrator::new(&config)?;
    orchestrator.prepare_dirs()?;

    tokio::select! {
        _ = scheduler::run(Arc::new(orchestrator), cadence) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Received Ctrl-C, shutting down");
        }
    }
    Ok(())
}
