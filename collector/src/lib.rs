//! # Metrics Tracker Collector
//!
//! Periodically queries the external sources of the tracked metrics and records what it finds.
//!
//! ## Features
//!
//! - **Collectors**: X followers, Telegram members, token holders, GitHub stars/forks/latest release
//! - **Milestones**: every configured threshold at or below a value is logged each cycle
//! - **Parquet history**: one row per available value, appended to `<partition>_<YYYY-MM-DD>.parquet`
//! - **JSON export**: the same values appended to the documents the viewer reads
//! - **Terminal report**: a per-cycle table of collector results
//!
//! ## Architecture
//!
//! - **`collectors`**: the `Collector` trait, the HTTP collectors and the `Orchestrator`
//! - **`metrics`**: source tags, parquet rows and cycle reports
//! - **`milestone`**: threshold checks
//! - **`writer`**: the date-partitioned parquet writer
//! - **`scheduler`**: start-up run plus the twice-daily cadence
//!
//! ## Usage
//!
//! ```bash
//! # Uses <config dir>/collector.yaml when present
//! metrics-tracker-collector
//!
//! # Explicit configuration, credentials from the environment
//! METRICS_TRACKER_X__BEARER_TOKEN=... metrics-tracker-collector --config ./collector.yaml -v
//! ```

#[macro_use]
extern crate tracing;

pub mod collectors;
pub mod metrics;
pub mod milestone;
pub mod scheduler;
pub mod writer;

pub use collectors::*;
pub use metrics::*;
