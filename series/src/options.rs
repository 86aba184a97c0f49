use crate::{
    SourceRef,
    Transform,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Controls how a series is loaded and shaped for display. Defaults apply no transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Honour a cached series for the same source.
    pub use_cache: bool,
    /// Skip the cache and ask intermediaries for a fresh copy. The result overwrites the cache entry.
    pub no_cache: bool,
    /// Sort newest first.
    pub sort_by_timestamp: bool,
    /// Keep at most this many records (`0` keeps all).
    pub limit: Option<usize>,
    /// Keep the tail instead of the head when truncating.
    pub latest: bool,
    /// Render the change against the row below.
    pub show_change: bool,
    /// Consulted once when the primary source cannot be fetched.
    pub backup_path: Option<SourceRef>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            no_cache: false,
            sort_by_timestamp: false,
            limit: None,
            latest: false,
            show_change: false,
            backup_path: None,
        }
    }
}

impl LoadOptions {
    pub fn honours_cache(&self) -> bool {
        self.use_cache && !self.no_cache
    }

    /// The same options with the cache bypassed, as used by a manual or timed refresh.
    pub fn refreshing(&self) -> Self {
        Self {
            no_cache: true,
            ..self.clone()
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            sort_by_timestamp: self.sort_by_timestamp,
            limit: self.limit,
            latest: self.latest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_cache_without_transformation() {
        let options: LoadOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, LoadOptions::default());
        assert!(options.honours_cache());
        assert_eq!(options.transform(), Transform::default());
    }

    #[test]
    fn refreshing_bypasses_cache() {
        let options = LoadOptions {
            limit: Some(10),
            ..Default::default()
        };
        let refreshing = options.refreshing();
        assert!(!refreshing.honours_cache());
        assert_eq!(refreshing.limit, Some(10));
    }
}
