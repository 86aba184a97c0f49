use chrono::{
    DateTime,
    NaiveDate,
    NaiveDateTime,
    SecondsFormat,
    Utc,
};
use serde::{
    de::Error as _,
    Deserialize,
    Deserializer,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};
use std::fmt;

/// Record identifier. Unique within its series only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

/// A single sample of a metric.
///
/// `id`, `timestamp` and `count` are typed; every other field of the JSON object is kept in
/// `extra` so documents written by newer collectors survive a load/export cycle untouched.
///
/// A `count` that is not an integer is unknown for this record only. Its raw value moves to
/// `extra` and is written back as it was read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for MetricRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut extra = Map::<String, Value>::deserialize(deserializer)?;

        let id = match extra.shift_remove("id") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(RecordId::deserialize(raw).map_err(D::Error::custom)?),
        };
        let timestamp = match extra.shift_remove("timestamp") {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(raw),
            Some(other) => return Err(D::Error::custom(format!("timestamp must be a string, got {other}"))),
        };
        let count = match extra.shift_remove("count") {
            None | Some(Value::Null) => None,
            Some(raw) => match raw.as_i64() {
                Some(count) => Some(count),
                None => {
                    extra.insert("count".to_string(), raw);
                    None
                }
            },
        };

        Ok(Self {
            id,
            timestamp,
            count,
            extra,
        })
    }
}

impl MetricRecord {
    pub fn new(id: impl Into<RecordId>, timestamp: DateTime<Utc>, count: i64) -> Self {
        Self {
            id: Some(id.into()),
            timestamp: Some(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
            count: Some(count),
            extra: Map::new(),
        }
    }

    /// The record's instant, if the timestamp is present and parseable.
    ///
    /// Accepts RFC 3339 as well as zone-less date-times and plain dates, both read as UTC.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_extension_fields() {
        let record: MetricRecord = serde_json::from_str(
            r#"{"id":"a1","timestamp":"2024-01-01T00:00:00Z","count":5,"source":"x","note":{"k":1}}"#,
        )
        .unwrap();
        assert_eq!(record.id, Some(RecordId::Text("a1".into())));
        assert_eq!(record.count, Some(5));
        assert_eq!(record.extra.get("source"), Some(&Value::from("x")));
        assert_eq!(record.extra.keys().collect::<Vec<_>>(), ["source", "note"]);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["note"]["k"], 1);
    }

    #[test]
    fn missing_and_null_fields_are_unknown() {
        let record: MetricRecord = serde_json::from_str(r#"{"timestamp":"2024-01-01T00:00:00Z","count":null}"#).unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.count, None);
    }

    #[test]
    fn non_integer_counts_are_unknown_but_kept() {
        let record: MetricRecord = serde_json::from_str(r#"{"id":3,"count":"100"}"#).unwrap();
        assert_eq!(record.count, None);
        assert_eq!(serde_json::to_value(&record).unwrap(), serde_json::json!({"id": 3, "count": "100"}));

        let record: MetricRecord = serde_json::from_str(r#"{"id":4,"count":12.5}"#).unwrap();
        assert_eq!(record.count, None);
        assert_eq!(record.extra.get("count"), Some(&Value::from(12.5)));
    }

    #[test]
    fn parses_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let with = |ts: &str| MetricRecord {
            timestamp: Some(ts.to_string()),
            ..Default::default()
        };
        assert_eq!(with("2024-01-02T00:00:00Z").parsed_timestamp(), Some(expected));
        assert_eq!(with("2024-01-02T01:00:00+01:00").parsed_timestamp(), Some(expected));
        assert_eq!(with("2024-01-02T00:00:00").parsed_timestamp(), Some(expected));
        assert_eq!(with("2024-01-02").parsed_timestamp(), Some(expected));
        assert_eq!(with("yesterday").parsed_timestamp(), None);
        assert_eq!(MetricRecord::default().parsed_timestamp(), None);
    }
}
