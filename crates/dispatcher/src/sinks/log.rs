//! LogSink - logs job summaries via tracing

use tracing::{info, instrument};

use crate::error::DispatcherError;
use crate::report::{JobReport, OutputSink};

/// Sink that logs the audit summary line by line
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_report(&self, report: &JobReport<'_>) {
        info!(
            sink = %self.name,
            job = %report.kind,
            recording = %report.recording.name,
            channels = report.recording.nbchan(),
            samples = report.recording.samples(),
            events = report.recording.events.len(),
            "job finished"
        );
        for line in report.summary.lines().filter(|l| !l.trim().is_empty()) {
            info!(sink = %self.name, "{line}");
        }
    }
}

impl OutputSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, report),
        fields(sink = %self.name, job = %report.kind)
    )]
    fn write(&mut self, report: &JobReport<'_>) -> Result<(), DispatcherError> {
        self.log_report(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::JobKind;
    use contracts::{ChannelInfo, Recording};
    use ndarray::Array2;

    #[test]
    fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let rec = Recording::continuous(50.0, Array2::zeros((1, 5)), vec![ChannelInfo::new("Fz")]);
        let report = JobReport {
            kind: JobKind::Overweight,
            recording: &rec,
            quality: None,
            summary: "windows: 3\n\nappended: 120",
        };
        assert!(sink.write(&report).is_ok());
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
