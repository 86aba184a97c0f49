use crate::{
    layered,
    Cadence,
};
use chrono::NaiveTime;
use eyre::{
    eyre,
    Result,
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
use url::Url;

const DEFAULT_COLLECTOR_CONFIG: &str = include_str!("default-collector.yaml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub data_dir: PathBuf,
    /// Prefix of the date-partitioned parquet files.
    pub partition: String,
    /// Local times of day (`HH:MM`) at which a collection cycle runs.
    pub schedule: Vec<String>,
    pub request_timeout: String,
    pub x: XConfig,
    pub telegram: TelegramConfig,
    pub holders: HoldersConfig,
    pub github: GithubConfig,
    pub milestones: MilestoneConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XConfig {
    pub api_base: Url,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub api_base: Url,
    pub chat_id: String,
    #[serde(default, skip_serializing)]
    pub bot_token: Option<String>,
}

/// An Etherscan-compatible `tokenholdercount` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldersConfig {
    pub api_base: Url,
    pub contract_address: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub api_base: Url,
    pub owner: String,
    pub repo: String,
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

/// Ascending threshold lists per metric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilestoneConfig {
    #[serde(default)]
    pub x_followers: Vec<i64>,
    #[serde(default)]
    pub telegram_members: Vec<i64>,
    #[serde(default)]
    pub token_holders: Vec<i64>,
    #[serde(default)]
    pub github_stars: Vec<i64>,
    #[serde(default)]
    pub github_forks: Vec<i64>,
}

impl CollectorConfig {
    /// Layers the built-in defaults, `collector.yaml` (or `explicit`) and the environment.
    pub fn new(explicit: Option<&Path>) -> Result<Self, config::ConfigError> {
        layered(DEFAULT_COLLECTOR_CONFIG, "collector.yaml", explicit)?
            .build()?
            .try_deserialize()
    }

    pub fn parquet_dir(&self) -> PathBuf {
        self.data_dir.join("parquet")
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.request_timeout)
            .map_err(|e| eyre!("Invalid request timeout '{}': {}", self.request_timeout, e))
    }

    pub fn cadence(&self) -> Result<Cadence> {
        let times = self
            .schedule
            .iter()
            .map(|time| {
                NaiveTime::parse_from_str(time.trim(), "%H:%M")
                    .map_err(|e| eyre!("Invalid schedule time '{}' (expected HH:MM): {}", time, e))
            })
            .collect::<Result<Vec<_>>>()?;
        if times.is_empty() {
            return Err(eyre!("The collection schedule is empty"));
        }
        Ok(Cadence::DailyAt(times))
    }
}
