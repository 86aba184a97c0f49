//! # Metric Series
//!
//! The data model shared by the viewer and the collector.
//!
//! - **`MetricRecord`**: one sample of a metric (`id`, `timestamp`, `count` plus any extra fields)
//! - **`MetricSeries`**: the records found under the first key of a metrics JSON document
//! - **`LoadOptions`** / **`SourceRef`**: where a series is loaded from and how it is shaped for display
//! - **`transform`**: pure sort/truncate functions applied before presentation
//! - **`export`**: appends new records to a metrics JSON document on disk

#[macro_use]
extern crate tracing;

mod document;
pub mod export;
mod options;
mod record;
mod source;
pub mod transform;

pub use document::{
    DocumentError,
    MetricSeries,
};
pub use options::LoadOptions;
pub use record::{
    MetricRecord,
    RecordId,
};
pub use source::SourceRef;
pub use transform::Transform;
