//! Sink implementations
//!
//! Contains LogSink and FileSink.

mod file;
mod log;

pub use self::file::{FileSink, FileSinkConfig, QUALITY_FILE, SUMMARY_FILE};
pub use self::log::LogSink;
