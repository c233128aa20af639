//! Sink metrics for observability

/// Counters for a single sink
#[derive(Debug, Default, Clone)]
pub struct SinkMetrics {
    /// Total successful writes
    write_count: u64,
    /// Total write failures
    failure_count: u64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total write count
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// Record a successful write
    pub fn record_write(&mut self, sink: &str) {
        self.write_count += 1;
        metrics::counter!("eyesync_sink_writes_total", "sink" => sink.to_string()).increment(1);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    /// Record a failed write
    pub fn record_failure(&mut self, sink: &str) {
        self.failure_count += 1;
        metrics::counter!("eyesync_sink_failures_total", "sink" => sink.to_string()).increment(1);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            write_count: self.write_count,
            failure_count: self.failure_count,
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub write_count: u64,
    pub failure_count: u64,
}
