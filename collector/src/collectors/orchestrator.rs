use crate::{
    collectors::{
        http,
        Collector,
        GithubApi,
        GithubCollector,
        GithubMetric,
        TelegramMembersCollector,
        TokenHoldersCollector,
        XFollowersCollector,
    },
    metrics::*,
    milestone::check_milestones,
    writer::PartitionWriter,
};
use chrono::{
    Local,
    SecondsFormat,
    Utc,
};
use eyre::{
    Context as _,
    Result,
};
use metrics_tracker_config::{
    CollectorConfig,
    MilestoneConfig,
};
use metrics_tracker_series::{
    export,
    MetricRecord,
};
use std::{
    fs,
    path::PathBuf,
};

pub type BoxedCollector = Box<dyn Collector + Send + Sync>;

/// Runs every collector of a cycle and persists what they return
pub struct Orchestrator {
    collectors: Vec<BoxedCollector>,
    milestones: MilestoneConfig,
    writer: PartitionWriter,
    partition: String,
    data_dir: PathBuf,
}

impl Orchestrator {
    /// Create an orchestrator with the HTTP collectors described by `config`
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        // One client shared by every collector
        let client = http::client(config.request_timeout()?)?;
        let github = GithubApi::new(config.github.clone(), client.clone());

        let collectors: Vec<BoxedCollector> = vec![
            Box::new(XFollowersCollector::new(config.x.clone(), client.clone())),
            Box::new(TelegramMembersCollector::new(config.telegram.clone(), client.clone())),
            Box::new(TokenHoldersCollector::new(config.holders.clone(), client)),
            Box::new(GithubCollector::new(github.clone(), GithubMetric::Stars)),
            Box::new(GithubCollector::new(github.clone(), GithubMetric::Forks)),
            Box::new(GithubCollector::new(github, GithubMetric::Release)),
        ];
        Ok(Self::with_collectors(config, collectors))
    }

    pub fn with_collectors(config: &CollectorConfig, collectors: Vec<BoxedCollector>) -> Self {
        Self {
            collectors,
            milestones: config.milestones.clone(),
            writer: PartitionWriter::new(config.parquet_dir()),
            partition: config.partition.clone(),
            data_dir: config.data_dir.clone(),
        }
    }

    /// Creates the data directory and its parquet subdirectory
    pub fn prepare_dirs(&self) -> Result<()> {
        for dir in [self.data_dir.as_path(), self.writer.dir()] {
            fs::create_dir_all(dir).wrap_err_with(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    fn thresholds(&self, source: SourceTag) -> &[i64] {
        match source {
            SourceTag::X => &self.milestones.x_followers,
            SourceTag::Telegram => &self.milestones.telegram_members,
            SourceTag::Holders => &self.milestones.token_holders,
            SourceTag::GithubStars => &self.milestones.github_stars,
            SourceTag::GithubForks => &self.milestones.github_forks,
        }
    }

    /// Runs one collection cycle. Collector, export and write failures are logged and reported,
    /// never propagated.
    #[tracing::instrument(skip(self), fields(collectors = self.collectors.len()))]
    pub async fn collect(&self) -> CycleReport {
        let started = Utc::now();
        let mut report = CycleReport::new(started);
        info!("Starting collection cycle");

        for collector in &self.collectors {
            let result = collector.collect().await;
            match &result {
                Ok(reading) => info!(collector = collector.name(), "{}", reading.status),
                Err(err) => error!(collector = collector.name(), error = %err, "Collector failed"),
            }
            report.outcomes.push(CollectorOutcome {
                collector: collector.name(),
                source: collector.source(),
                result: result.map_err(|err| format!("{err:#}")),
            });
        }

        let values: Vec<(SourceTag, i64)> = report.values().collect();

        for (source, value) in &values {
            let events = check_milestones(source.milestone_name(), *value, self.thresholds(*source));
            for event in &events {
                info!(
                    metric = %event.metric_name,
                    threshold = event.threshold,
                    current = event.current_value,
                    "Milestone reached"
                );
            }
            report.milestones.extend(events);
        }

        let base_id = started.timestamp_millis();
        let timestamp = started.to_rfc3339_opts(SecondsFormat::Millis, true);
        let rows: Vec<MetricRow> = values
            .iter()
            .map(|(source, value)| MetricRow {
                id: base_id + source.ordinal(),
                timestamp: timestamp.clone(),
                count: *value,
                source: *source,
            })
            .collect();

        let date = Local::now().date_naive();
        report.rows_written = self
            .writer
            .append_on(date, &rows, &MetricRow::schema(), &self.partition);
        if report.rows_written > 0 {
            report.partition_file = Some(self.writer.partition_path(&self.partition, date));
        }

        for row in &rows {
            let path = self.data_dir.join(row.source.export_file());
            let record = MetricRecord::new(row.id, started, row.count);
            match export::append_record(&path, row.source.export_key(), record) {
                Ok(len) => debug!(path = %path.display(), records = len, "exported record"),
                Err(err) => warn!(path = %path.display(), error = %format!("{err:#}"), "Failed to export record"),
            }
        }

        report.finalize();
        info!(
            values = values.len(),
            failures = report.failures(),
            rows = report.rows_written,
            "Collection cycle finished"
        );
        report
    }
}
