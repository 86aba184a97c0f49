use crate::{
    layered,
    Cadence,
};
use eyre::{
    eyre,
    Result,
};
use metrics_tracker_series::{
    LoadOptions,
    SourceRef,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

const DEFAULT_VIEWER_CONFIG: &str = include_str!("default-viewer.yaml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub data_dir: PathBuf,
    #[serde(default)]
    pub auto_refresh: bool,
    pub auto_refresh_interval: String,
    pub request_timeout: String,
    #[serde(default)]
    pub panels: Vec<PanelConfig>,
}

/// One table on screen and the document that fills it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub id: String,
    pub title: String,
    pub source: SourceRef,
    #[serde(default)]
    pub options: LoadOptions,
}

impl ViewerConfig {
    /// Layers the built-in defaults, `viewer.yaml` (or `explicit`), the environment and `overrides`.
    pub fn new<S>(explicit: Option<&Path>, overrides: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        layered(DEFAULT_VIEWER_CONFIG, "viewer.yaml", explicit)?
            .add_source(overrides)
            .build()?
            .try_deserialize()
    }

    pub fn auto_refresh_interval(&self) -> Result<Duration> {
        humantime::parse_duration(&self.auto_refresh_interval)
            .map_err(|e| eyre!("Invalid auto refresh interval '{}': {}", self.auto_refresh_interval, e))
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.request_timeout)
            .map_err(|e| eyre!("Invalid request timeout '{}': {}", self.request_timeout, e))
    }

    pub fn refresh_cadence(&self) -> Result<Cadence> {
        Ok(Cadence::Every(self.auto_refresh_interval()?))
    }

    /// Panels with relative source and backup paths resolved against the data directory.
    pub fn resolved_panels(&self) -> Vec<PanelConfig> {
        self.panels
            .iter()
            .cloned()
            .map(|mut panel| {
                panel.source = panel.source.resolve_against(&self.data_dir);
                panel.options.backup_path = panel
                    .options
                    .backup_path
                    .map(|backup| backup.resolve_against(&self.data_dir));
                panel
            })
            .collect()
    }
}
