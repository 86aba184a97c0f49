pub mod reading;
pub mod report;

use arrow::datatypes::{
    DataType,
    Field,
    Schema,
    SchemaRef,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::sync::{
    Arc,
    OnceLock,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
};

// Re-export the main types for easy access
pub use reading::*;
pub use report::*;

/// The recorded metrics. The order is the order of rows within a cycle's batch.
#[derive(Debug, Clone, Copy, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceTag {
    X,
    Telegram,
    Holders,
    GithubStars,
    GithubForks,
}

impl SourceTag {
    /// Name used when reporting milestones.
    pub fn milestone_name(&self) -> &'static str {
        match self {
            SourceTag::X => "x_followers",
            SourceTag::Telegram => "telegram_members",
            SourceTag::Holders => "token_holders",
            SourceTag::GithubStars => "github_stars",
            SourceTag::GithubForks => "github_forks",
        }
    }

    /// JSON document the viewer reads for this metric, relative to the data directory.
    pub fn export_file(&self) -> &'static str {
        match self {
            SourceTag::X => "x_metrics.json",
            SourceTag::Telegram => "telegram_metrics.json",
            SourceTag::Holders => "token_holders.json",
            SourceTag::GithubStars => "github_stars.json",
            SourceTag::GithubForks => "github_forks.json",
        }
    }

    /// Top-level key of a freshly created JSON document.
    pub fn export_key(&self) -> &'static str {
        match self {
            SourceTag::X => "followers",
            SourceTag::Telegram => "members",
            SourceTag::Holders => "holders",
            SourceTag::GithubStars => "stars",
            SourceTag::GithubForks => "forks",
        }
    }

    /// Offset added to the cycle's base id.
    pub fn ordinal(&self) -> i64 {
        *self as i64
    }
}

/// One row of the parquet partition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    pub id: i64,
    pub timestamp: String,
    pub count: i64,
    pub source: SourceTag,
}

impl MetricRow {
    pub fn schema() -> SchemaRef {
        static SCHEMA: OnceLock<SchemaRef> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                Arc::new(Schema::new(vec![
                    Field::new("id", DataType::Int64, false),
                    Field::new("timestamp", DataType::Utf8, false),
                    Field::new("count", DataType::Int64, false),
                    Field::new("source", DataType::Utf8, false),
                ]))
            })
            .clone()
    }
}
