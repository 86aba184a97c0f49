//! Turns a transformed series into display rows.

use chrono::Local;
use metrics_tracker_series::MetricRecord;
use std::fmt;

const PLACEHOLDER: &str = "N/A";

/// Difference between a row's count and the count of the row below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    /// Wide enough for any two `i64` counts.
    pub delta: i128,
    /// `None` when the row below has a count of zero.
    pub percent: Option<f64>,
}

impl Change {
    pub fn between(current: i64, previous: i64) -> Self {
        let delta = i128::from(current) - i128::from(previous);
        let percent = (previous != 0).then(|| delta as f64 / previous as f64 * 100.0);
        Self { delta, percent }
    }

    pub fn is_negative(&self) -> bool {
        self.delta < 0
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.delta >= 0 { "+" } else { "" };
        match self.percent {
            Some(percent) => write!(f, "{sign}{} ({percent:.2}%)", format_thousands(self.delta)),
            None => write!(f, "{sign}{} ({PLACEHOLDER})", format_thousands(self.delta)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub id: String,
    pub timestamp: String,
    pub count: String,
    pub change: Option<Change>,
}

/// One row per record, in order. With `show_change`, every row but the last whose own count and
/// the next row's count are both known carries a [`Change`].
pub fn present(records: &[MetricRecord], show_change: bool) -> Vec<RenderedRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let change = match (show_change, record.count, records.get(i + 1).and_then(|next| next.count)) {
                (true, Some(current), Some(previous)) => Some(Change::between(current, previous)),
                _ => None,
            };
            RenderedRow {
                id: record
                    .id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                timestamp: format_timestamp(record),
                count: record
                    .count
                    .map(format_thousands)
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                change,
            }
        })
        .collect()
}

/// Local time when the timestamp parses, the raw text when it does not.
fn format_timestamp(record: &MetricRecord) -> String {
    match (record.parsed_timestamp(), record.timestamp.as_deref()) {
        (Some(ts), _) => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        (None, Some(raw)) => raw.to_string(),
        (None, None) => PLACEHOLDER.to_string(),
    }
}

pub fn format_thousands<T: Into<i128>>(value: T) -> String {
    let value: i128 = value.into();
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
