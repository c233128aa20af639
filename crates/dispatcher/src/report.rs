//! Job report and sink contract

use std::fmt;

use contracts::{Recording, SyncQualityReport};

use crate::error::DispatcherError;

/// Which operation produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Sync,
    Overweight,
}

impl JobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Sync => "sync",
            JobKind::Overweight => "overweight",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a finished job hands to the sinks
#[derive(Debug, Clone, Copy)]
pub struct JobReport<'a> {
    pub kind: JobKind,
    pub recording: &'a Recording,
    /// Present for synchronization jobs
    pub quality: Option<&'a SyncQualityReport>,
    /// Human-readable audit text
    pub summary: &'a str,
}

/// Destination for job reports
pub trait OutputSink {
    /// Sink name for diagnostics
    fn name(&self) -> &str;

    /// Persist or publish one report
    fn write(&mut self, report: &JobReport<'_>) -> Result<(), DispatcherError>;

    /// Flush buffered output
    fn flush(&mut self) -> Result<(), DispatcherError> {
        Ok(())
    }
}
