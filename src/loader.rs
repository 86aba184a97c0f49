//! # Loader
//!
//! Fetches a metrics document, caches the parsed series, shapes it and hands the rows to a panel.
//!
//! - A cached series is reused while `use_cache` is set and `no_cache` is not
//! - Transport failures (unreachable source, non-2xx status) are shown on the panel and the
//!   backup source, when configured, is tried once
//! - Malformed documents are shown on the panel and never cached; there is no fallback for them
//!
//! Nothing is returned to the caller: every outcome ends up on the surface and in the log.

use crate::{
    board::Surface,
    fetch::{
        Fetch,
        LoadError,
    },
    presenter,
    store::MetricSeriesStore,
};
use metrics_tracker_series::{
    transform,
    LoadOptions,
    MetricRecord,
    MetricSeries,
    SourceRef,
};
use std::iter;

/// How many backup sources a single load may fall back to.
pub const MAX_FALLBACK_HOPS: usize = 1;

pub struct MetricsLoader<F> {
    fetcher: F,
    store: MetricSeriesStore,
}

impl<F: Fetch> MetricsLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            store: MetricSeriesStore::new(),
        }
    }

    pub fn store(&self) -> &MetricSeriesStore {
        &self.store
    }

    #[tracing::instrument(skip(self, options, surface), fields(source = %source))]
    pub async fn load<S: Surface>(&mut self, source: &SourceRef, panel: &str, options: &LoadOptions, surface: &mut S) {
        let attempts = iter::once(source)
            .chain(options.backup_path.as_ref())
            .take(1 + MAX_FALLBACK_HOPS);

        for (hop, attempt) in attempts.enumerate() {
            match self.load_once(attempt, options).await {
                Ok(records) => {
                    debug!(source = %attempt, records = records.len(), hop, "loaded");
                    surface.show_rows(panel, presenter::present(&records, options.show_change));
                    return;
                }
                Err(err) => {
                    error!(source = %attempt, error = %err, hop, "Failed to load metrics");
                    surface.show_error(panel, err.to_string());
                    if !err.is_transport() {
                        return;
                    }
                }
            }
        }
    }

    async fn load_once(&mut self, source: &SourceRef, options: &LoadOptions) -> Result<Vec<MetricRecord>, LoadError> {
        let transform = options.transform();

        if options.honours_cache() {
            if let Some(series) = self.store.get(source) {
                debug!(source = %source, "cache hit");
                return Ok(transform::apply(&series.records, &transform));
            }
        }

        let bytes = self.fetcher.fetch(source, options.no_cache).await?;
        let series = MetricSeries::from_slice(&bytes)?;
        let records = transform::apply(&series.records, &transform);
        self.store.put(source.clone(), series);
        Ok(records)
    }
}
