//! # Dispatcher
//!
//! Output routing for finished jobs.
//!
//! Responsibilities:
//! - Hand each `JobReport` to every configured sink
//! - Isolate sink failures so one broken sink does not stop the others
//! - Count writes and failures per sink

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod report;
pub mod sinks;

pub use dispatcher::{DispatchOutcome, Dispatcher, DispatcherBuilder};
pub use error::DispatcherError;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use report::{JobKind, JobReport, OutputSink};
pub use sinks::{FileSink, FileSinkConfig, LogSink, QUALITY_FILE, SUMMARY_FILE};
