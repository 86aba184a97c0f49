//! # Metrics Tracker
//!
//! Terminal viewer for the metrics documents written by `metrics-tracker-collector`.
//!
//! Each configured panel names a JSON document (a file path or an HTTP(S) URL) and how to shape
//! it: newest first, at most N rows, with the change against the row below. Panels are reloaded
//! on Enter and, with `--auto-refresh`, on a fixed interval.
//!
//! - **`fetch`**: retrieves raw documents and classifies failures
//! - **`store`**: per-process cache of parsed series
//! - **`loader`**: fetch, cache, transform and present, with one backup fallback
//! - **`presenter`**: display rows and changes
//! - **`board`**: the panels printed to the terminal

#[macro_use]
extern crate tracing;

mod app;
pub mod args;
pub mod board;
mod errors;
pub mod fetch;
pub mod loader;
mod logging;
pub mod presenter;
pub mod store;

pub use app::{
    Action,
    App,
};
pub use args::Args;
pub use errors::init_errors;
pub use logging::init_logging;
