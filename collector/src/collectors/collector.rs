use crate::metrics::{
    Reading,
    SourceTag,
};
use eyre::Result;
use std::{
    future::Future,
    pin::Pin,
};

/// One external data source queried once per cycle.
pub trait Collector {
    /// Query the source for its current value
    fn collect(&self) -> Pin<Box<dyn Future<Output = Result<Reading>> + Send + '_>>;

    /// The metric this collector's value is recorded under, `None` if it is only logged
    fn source(&self) -> Option<SourceTag>;

    /// Get the name of this collector
    fn name(&self) -> &'static str;
}
