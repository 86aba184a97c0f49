use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

/// What a collector returns: a human readable status line plus a source-specific summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub status: String,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Summary {
    /// Followers, members, holders.
    Count(i64),
    /// Stars or forks of a repository.
    Repository { current: i64, repository: String },
    /// Latest published release. Carries no count.
    Release {
        tag: String,
        name: Option<String>,
        published_at: Option<DateTime<Utc>>,
    },
}

impl Reading {
    pub fn count(status: impl Into<String>, count: i64) -> Self {
        Self {
            status: status.into(),
            summary: Summary::Count(count),
        }
    }

    pub fn repository(status: impl Into<String>, current: i64, repository: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            summary: Summary::Repository {
                current,
                repository: repository.into(),
            },
        }
    }

    /// The numeric value recorded for this reading, if it has one.
    pub fn current(&self) -> Option<i64> {
        match &self.summary {
            Summary::Count(count) => Some(*count),
            Summary::Repository { current, .. } => Some(*current),
            Summary::Release { .. } => None,
        }
    }
}
