use color_eyre::Result;
use eyre::Context as _;
use metrics_tracker_config::get_data_dir;
use std::{
    fs::OpenOptions,
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::{
    fmt,
    prelude::*,
    EnvFilter,
};

lazy_static::lazy_static! {
    static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Logs to `<data dir>/metrics-tracker.log` so log lines never interleave with the tables.
///
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) -> Result<PathBuf> {
    let directory = get_data_dir();
    std::fs::create_dir_all(&directory)
        .wrap_err_with(|| format!("Failed to create {}", directory.display()))?;
    let log_path = directory.join(LOG_FILE.as_str());
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .wrap_err_with(|| format!("Failed to open {}", log_path.display()))?;

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false)
                .with_filter(filter),
        )
        .with(tracing_error::ErrorLayer::default())
        .try_init()?;
    Ok(log_path)
}
