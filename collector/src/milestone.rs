//! Milestone detection.
//!
//! Stateless: every threshold at or below the current value is reported on every call. Nothing
//! remembers which milestones were already announced, so a crossed threshold is reported again
//! in each following cycle.

use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneEvent {
    pub metric_name: String,
    pub threshold: i64,
    pub current_value: i64,
}

/// Returns one event per threshold with `current_value >= threshold`, in threshold order.
pub fn check_milestones(metric_name: &str, current_value: i64, thresholds: &[i64]) -> Vec<MilestoneEvent> {
    thresholds
        .iter()
        .filter(|threshold| current_value >= **threshold)
        .map(|threshold| MilestoneEvent {
            metric_name: metric_name.to_string(),
            threshold: *threshold,
            current_value,
        })
        .collect()
}
