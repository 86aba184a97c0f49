//! Runs a collection cycle at start-up and then on every firing of the configured cadence.

use crate::{
    collectors::Orchestrator,
    metrics::CycleReport,
};
use metrics_tracker_config::{
    Cadence,
    Ticker,
};
use std::sync::Arc;

/// Never returns. A failed or panicking cycle is logged and the next one runs on schedule.
pub async fn run(orchestrator: Arc<Orchestrator>, cadence: Cadence) {
    run_cycle(orchestrator.clone()).await;

    let mut ticker = Ticker::new(cadence);
    loop {
        ticker.tick().await;
        run_cycle(orchestrator.clone()).await;
    }
}

/// Runs one cycle on its own task so a panic inside it cannot take the scheduler down.
pub async fn run_cycle(orchestrator: Arc<Orchestrator>) -> Option<CycleReport> {
    match tokio::spawn(async move { orchestrator.collect().await }).await {
        Ok(report) => {
            println!("{}", report.format());
            debug!(summary = %report.summary(), "cycle summary");
            Some(report)
        }
        Err(err) => {
            error!(error = %err, "Collection cycle aborted");
            None
        }
    }
}
