//! # Configuration
//!
//! Layered configuration for the viewer and the collector, in increasing precedence:
//!
//! 1. built-in defaults (`default-viewer.yaml`, `default-collector.yaml`)
//! 2. `viewer.yaml` / `collector.yaml` in the config directory, or an explicit `--config` file
//! 3. `METRICS_TRACKER_*` environment variables, nested keys separated by `__`
//! 4. command line overrides
//!
//! Also home to the data/config directory lookup and the [`Cadence`] timing primitive.

#[macro_use]
extern crate tracing;

mod app_config;
mod collector_config;
mod schedule;
mod viewer_config;

use app_config::PROJECT_NAME;
pub use app_config::{
    get_config_dir,
    get_data_dir,
    APP_NAME,
};
pub use collector_config::{
    CollectorConfig,
    GithubConfig,
    HoldersConfig,
    MilestoneConfig,
    TelegramConfig,
    XConfig,
};
use config::{
    builder::DefaultState,
    ConfigBuilder,
    ConfigError,
};
pub use schedule::{
    Cadence,
    Ticker,
};
use std::path::Path;
pub use viewer_config::{
    PanelConfig,
    ViewerConfig,
};

fn layered(
    default_yaml: &str,
    file_name: &str,
    explicit: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let data_dir = get_data_dir();
    let config_dir = get_config_dir();
    let mut builder = config::Config::builder()
        .set_default("data_dir", data_dir.to_string_lossy().into_owned())?
        .set_default("config_dir", config_dir.to_string_lossy().into_owned())?
        .add_source(config::File::from_str(default_yaml, config::FileFormat::Yaml));

    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (config_dir.join(file_name), false),
    };
    debug!(path = %path.display(), required, "reading configuration file");
    builder = builder.add_source(
        config::File::from(path)
            .format(config::FileFormat::Yaml)
            .required(required),
    );

    Ok(builder.add_source(environment()))
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(&PROJECT_NAME)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
