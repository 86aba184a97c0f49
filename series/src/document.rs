use crate::MetricRecord;
use serde_json::{
    Map,
    Value,
};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected data structure: expected an object whose first key holds an array")]
    Shape,
    #[error("record {index} of `{key}` is malformed: {reason}")]
    Record {
        key: String,
        index: usize,
        reason: serde_json::Error,
    },
}

/// The records stored under the first key of a metrics document.
///
/// A document looks like `{"followers": [{"id": 1, "timestamp": "...", "count": 100}, ...]}`.
/// Only the first key (in document order) is read, whatever its name. Later keys are not
/// interpreted but are kept in `others` and written back by [`MetricSeries::to_value`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    pub key: String,
    pub records: Vec<MetricRecord>,
    pub others: Map<String, Value>,
}

impl MetricSeries {
    pub fn new(key: impl Into<String>, records: Vec<MetricRecord>) -> Self {
        Self {
            key: key.into(),
            records,
            others: Map::new(),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(map) = value else {
            return Err(DocumentError::Shape);
        };
        let mut entries = map.into_iter();
        let Some((key, Value::Array(items))) = entries.next() else {
            return Err(DocumentError::Shape);
        };
        let others = entries.collect();

        let records = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item).map_err(|reason| DocumentError::Record {
                    key: key.clone(),
                    index,
                    reason,
                })
            })
            .collect::<Result<Vec<MetricRecord>, _>>()?;

        Ok(Self { key, records, others })
    }

    pub fn to_value(&self) -> Value {
        let records = self
            .records
            .iter()
            .map(|record| serde_json::to_value(record).unwrap_or(Value::Null))
            .collect();
        let mut map = Map::new();
        map.insert(self.key.clone(), Value::Array(records));
        map.extend(self.others.clone());
        Value::Object(map)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
