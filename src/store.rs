use metrics_tracker_series::{
    MetricSeries,
    SourceRef,
};
use std::collections::HashMap;

/// Parsed series keyed by the source they were loaded from. Lives as long as the viewer;
/// entries are only ever replaced, never evicted.
#[derive(Debug, Default)]
pub struct MetricSeriesStore {
    series: HashMap<SourceRef, MetricSeries>,
}

impl MetricSeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &SourceRef) -> Option<&MetricSeries> {
        self.series.get(source)
    }

    pub fn put(&mut self, source: SourceRef, series: MetricSeries) {
        self.series.insert(source, series);
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
