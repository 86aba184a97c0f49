//! Pure series transformations, applied in a fixed order: sort, then truncate.
//!
//! Truncation works on the already-sorted sequence. With `sort_by_timestamp` and `latest` both
//! set, the tail of a newest-first list is kept, i.e. the *oldest* `limit` records.

use crate::MetricRecord;
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transform {
    pub sort_by_timestamp: bool,
    pub limit: Option<usize>,
    pub latest: bool,
}

/// Sorts newest first. Stable; records without a parseable timestamp go last.
pub fn sort_newest_first(records: &mut [MetricRecord]) {
    records.sort_by_cached_key(|record| Reverse(record.parsed_timestamp()));
}

/// Keeps the first `limit` records, or the last `limit` when `latest` is set.
pub fn truncate(mut records: Vec<MetricRecord>, limit: Option<usize>, latest: bool) -> Vec<MetricRecord> {
    let limit = match limit {
        Some(limit) if limit > 0 && records.len() > limit => limit,
        _ => return records,
    };
    if latest {
        records.drain(..records.len() - limit);
    } else {
        records.truncate(limit);
    }
    records
}

pub fn apply(records: &[MetricRecord], transform: &Transform) -> Vec<MetricRecord> {
    let mut records = records.to_vec();
    if transform.sort_by_timestamp {
        sort_newest_first(&mut records);
    }
    truncate(records, transform.limit, transform.latest)
}
