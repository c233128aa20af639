//! Dispatcher - fan-out of job reports to sinks

use contracts::OutputConfig;
use tracing::{info, instrument, warn};

use crate::error::DispatcherError;
use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::report::{JobReport, OutputSink};
use crate::sinks::{FileSink, FileSinkConfig, LogSink};

/// Builder for creating a Dispatcher
#[derive(Default)]
pub struct DispatcherBuilder {
    sinks: Vec<Box<dyn OutputSink>>,
}

impl DispatcherBuilder {
    /// Create an empty DispatcherBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sinks described by the job's output section
    #[instrument(name = "dispatcher_from_config", skip(output), fields(dir = %output.dir.display()))]
    pub fn from_config(output: &OutputConfig) -> Result<Self, DispatcherError> {
        let file = FileSink::new("file", FileSinkConfig::from_output(output))
            .map_err(|e| DispatcherError::sink_creation("file", e.to_string()))?;
        let mut builder = Self::new().with_sink(file);
        if output.log_summary {
            builder = builder.with_sink(LogSink::new("log"));
        }
        Ok(builder)
    }

    /// Add a sink
    pub fn with_sink<S: OutputSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Build the dispatcher
    pub fn build(self) -> Dispatcher {
        let metrics = vec![SinkMetrics::new(); self.sinks.len()];
        Dispatcher {
            sinks: self.sinks,
            metrics,
        }
    }
}

/// Per-report result of a dispatch
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Sinks that accepted the report
    pub delivered: Vec<String>,
    /// Sinks that failed, with their error
    pub failed: Vec<(String, DispatcherError)>,
}

impl DispatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// First failure as an error, if any
    pub fn into_result(self) -> Result<Vec<String>, DispatcherError> {
        match self.failed.into_iter().next() {
            Some((_, error)) => Err(error),
            None => Ok(self.delivered),
        }
    }
}

/// Fans job reports out to every sink
pub struct Dispatcher {
    sinks: Vec<Box<dyn OutputSink>>,
    metrics: Vec<SinkMetrics>,
}

impl Dispatcher {
    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.sinks
            .iter()
            .zip(&self.metrics)
            .map(|(s, m)| (s.name().to_string(), m.snapshot()))
            .collect()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Write `report` to every sink.
    ///
    /// A failing sink is logged and counted; the remaining sinks still run.
    #[instrument(name = "dispatcher_dispatch", skip(self, report), fields(job = %report.kind))]
    pub fn dispatch(&mut self, report: &JobReport<'_>) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        for (sink, metrics) in self.sinks.iter_mut().zip(self.metrics.iter_mut()) {
            let name = sink.name().to_string();
            match sink.write(report).and_then(|()| sink.flush()) {
                Ok(()) => {
                    metrics.record_write(&name);
                    outcome.delivered.push(name);
                }
                Err(e) => {
                    metrics.record_failure(&name);
                    warn!(sink = %name, error = %e, "Sink write failed");
                    outcome.failed.push((name, e));
                }
            }
        }

        info!(
            delivered = outcome.delivered.len(),
            failed = outcome.failed.len(),
            "Report dispatched"
        );
        outcome
    }
}
