//! Appends records to a metrics JSON document, creating it on first use.
//!
//! The document keeps its existing first key; `key` is only used when the file is created.
//! Writes go to a sibling temporary file that is renamed over the document.

use crate::{
    MetricRecord,
    MetricSeries,
};
use eyre::{
    Context as _,
    Result,
};
use std::{
    fs,
    path::Path,
};

/// Appends `record` and returns the resulting number of records in the document.
pub fn append_record(path: &Path, key: &str, record: MetricRecord) -> Result<usize> {
    let mut series = if path.exists() {
        let bytes = fs::read(path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        MetricSeries::from_slice(&bytes).wrap_err_with(|| format!("Failed to parse {}", path.display()))?
    } else {
        debug!(path = %path.display(), key, "creating metrics document");
        MetricSeries::new(key, Vec::new())
    };
    series.records.push(record);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_vec_pretty(&series.to_value()).context("Failed to serialize metrics document")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).wrap_err_with(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).wrap_err_with(|| format!("Failed to replace {}", path.display()))?;

    Ok(series.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{
        TimeZone,
        Utc,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn creates_then_appends() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.child("x_metrics.json");
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        assert_eq!(append_record(&path, "followers", MetricRecord::new(1, ts, 100)).unwrap(), 1);
        assert_eq!(append_record(&path, "ignored", MetricRecord::new(2, ts, 150)).unwrap(), 2);

        let series = MetricSeries::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(series.key, "followers");
        assert_eq!(
            series.records.iter().map(|r| r.count).collect::<Vec<_>>(),
            [Some(100), Some(150)]
        );
        assert_eq!(series.records[0].timestamp.as_deref(), Some("2024-01-01T12:00:00.000Z"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn appending_keeps_other_top_level_entries() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.child("telegram_metrics.json");
        fs::write(&path, br#"{"members":[],"chat":{"title":"Metrics"}}"#).unwrap();

        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(append_record(&path, "members", MetricRecord::new(1, ts, 10)).unwrap(), 1);

        let written: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["chat"]["title"], "Metrics");
        assert_eq!(written["members"][0]["count"], 10);
    }

    #[test]
    fn refuses_to_overwrite_malformed_documents() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.child("broken.json");
        fs::write(&path, b"{\"followers\": 3}").unwrap();

        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(append_record(&path, "followers", MetricRecord::new(1, ts, 1)).is_err());
        assert_eq!(fs::read(&path).unwrap(), b"{\"followers\": 3}");
    }
}
