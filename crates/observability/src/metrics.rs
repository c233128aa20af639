//! Alignment metrics
//!
//! Records sync-quality and overweighting figures through the `metrics` facade
//! and provides running statistics for residual summaries.

use contracts::{AlignmentMode, SyncQualityReport};
use metrics::{counter, gauge, histogram};

/// Record metrics for a finished alignment
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_quality_metrics;
///
/// let outcome = engine.synchronize(&recording, &bundle)?;
/// record_quality_metrics(&outcome.quality);
/// ```
pub fn record_quality_metrics(report: &SyncQualityReport) {
    let mode = match report.mode {
        AlignmentMode::TwoPoint => "two_point",
        AlignmentMode::Regression => "regression",
    };
    counter!("eyesync_alignments_total", "mode" => mode).increment(1);

    gauge!("eyesync_matched_pairs").set(report.rows.len() as f64);
    gauge!("eyesync_mean_abs_residual_samples").set(report.mean_abs_residual);
    gauge!("eyesync_max_abs_residual_samples").set(report.max_abs_residual);

    if report.ambiguous_count > 0 {
        counter!("eyesync_ambiguous_matches_total").increment(report.ambiguous_count as u64);
    }

    for row in &report.rows {
        histogram!("eyesync_residual_samples").record(row.residual.abs());
    }
}

/// Record metrics for an overweighting run
pub fn record_overweight_metrics(event_type: &str, windows: usize, appended_samples: usize) {
    counter!("eyesync_overweight_runs_total").increment(1);
    gauge!(
        "eyesync_overweight_windows",
        "event_type" => event_type.to_string()
    )
    .set(windows as f64);
    histogram!("eyesync_overweight_appended_samples").record(appended_samples as f64);
}

/// Snapshot of a [`RunningStats`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.count {
            0 => f.write_str("no samples"),
            n => write!(
                f,
                "n={n} mean={:.3} sd={:.3} range=[{:.3}, {:.3}]",
                self.mean, self.std_dev, self.min, self.max
            ),
        }
    }
}

/// Single-pass mean, spread and extremes of a residual series.
///
/// Uses Welford's update so long series do not lose precision.
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    sum_sq_dev: f64,
    extremes: Option<(f64, f64)>,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let before = value - self.mean;
        self.mean += before / self.count as f64;
        self.sum_sq_dev += before * (value - self.mean);
        self.extremes = Some(match self.extremes {
            None => (value, value),
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
        });
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// 0.0 when empty
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance, 0.0 below two samples
    pub fn variance(&self) -> f64 {
        match self.count {
            0 | 1 => 0.0,
            n => self.sum_sq_dev / (n - 1) as f64,
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 0.0 when empty
    pub fn min(&self) -> f64 {
        self.extremes.map_or(0.0, |(lo, _)| lo)
    }

    /// 0.0 when empty
    pub fn max(&self) -> f64 {
        self.extremes.map_or(0.0, |(_, hi)| hi)
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            count: self.count,
            min: self.min(),
            max: self.max(),
            mean: self.mean(),
            std_dev: self.std_dev(),
        }
    }
}

impl Extend<f64> for RunningStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        iter.into_iter().for_each(|value| self.push(value));
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::default();
        stats.extend(iter);
        stats
    }
}
