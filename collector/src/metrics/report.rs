use super::{
    Reading,
    SourceTag,
};
use crate::milestone::MilestoneEvent;
use chrono::{
    DateTime,
    Utc,
};
use comfy_table::{
    presets,
    Attribute,
    Cell,
    Color,
    ContentArrangement,
    Table,
};
use std::path::PathBuf;

/// Result of running one collector within a cycle.
#[derive(Debug, Clone)]
pub struct CollectorOutcome {
    pub collector: &'static str,
    pub source: Option<SourceTag>,
    pub result: Result<Reading, String>,
}

/// Everything a single collection cycle produced.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub outcomes: Vec<CollectorOutcome>,
    pub milestones: Vec<MilestoneEvent>,
    pub rows_written: usize,
    pub partition_file: Option<PathBuf>,
}

impl CycleReport {
    pub fn new(started: DateTime<Utc>) -> Self {
        Self {
            started,
            finished: started,
            outcomes: Vec::new(),
            milestones: Vec::new(),
            rows_written: 0,
            partition_file: None,
        }
    }

    pub fn finalize(&mut self) {
        self.finished = Utc::now();
    }

    /// The recorded value per metric, in collection order. Failed collectors contribute nothing.
    pub fn values(&self) -> impl Iterator<Item = (SourceTag, i64)> + '_ {
        self.outcomes.iter().filter_map(|outcome| {
            let reading = outcome.result.as_ref().ok()?;
            Some((outcome.source?, reading.current()?))
        })
    }

    pub fn value(&self, source: SourceTag) -> Option<i64> {
        self.values().find(|(tag, _)| *tag == source).map(|(_, value)| value)
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err()).count()
    }

    pub fn format(&self) -> String {
        let mut output = String::new();

        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("📈 COLLECTOR").add_attribute(Attribute::Bold).fg(Color::Cyan),
                Cell::new("Value").add_attribute(Attribute::Bold),
                Cell::new("Status").add_attribute(Attribute::Bold),
            ]);

        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(reading) => table.add_row(vec![
                    Cell::new(outcome.collector).add_attribute(Attribute::Bold),
                    Cell::new(
                        reading
                            .current()
                            .map(|value| value.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::new(&reading.status).fg(Color::Green),
                ]),
                Err(error) => table.add_row(vec![
                    Cell::new(outcome.collector).add_attribute(Attribute::Bold),
                    Cell::new("N/A"),
                    Cell::new(format!("❌ {error}")).fg(Color::Red),
                ]),
            };
        }

        output.push_str(&format!(
            "\nCollection at {} ({:.1}s)\n",
            self.started.format("%Y-%m-%d %H:%M:%S UTC"),
            (self.finished - self.started).num_milliseconds() as f64 / 1000.0
        ));
        output.push_str(&format!("{table}\n"));

        for event in &self.milestones {
            output.push_str(&format!(
                "🏁 {} reached {} (current: {})\n",
                event.metric_name, event.threshold, event.current_value
            ));
        }

        match &self.partition_file {
            Some(path) => output.push_str(&format!("{} rows written to {}\n", self.rows_written, path.display())),
            None => output.push_str("No rows written\n"),
        }

        output
    }

    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "started": self.started,
            "finished": self.finished,
            "values": self
                .values()
                .map(|(tag, value)| (tag.to_string(), serde_json::Value::from(value)))
                .collect::<serde_json::Map<_, _>>(),
            "failures": self
                .outcomes
                .iter()
                .filter_map(|outcome| outcome.result.as_ref().err().map(|error| {
                    serde_json::json!({ "collector": outcome.collector, "error": error })
                }))
                .collect::<Vec<_>>(),
            "milestones": self.milestones,
            "rows_written": self.rows_written,
        })
    }
}
