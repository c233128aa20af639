//! # Observability
//!
//! Logging setup and run metrics for eyesync.
//!
//! The binary installs a `tracing` subscriber once through [`init_with_config`].
//! Library crates report alignment and overweighting figures through the
//! `metrics` facade; without an installed recorder those calls are no-ops.
//!
//! ## Usage
//!
//! ```ignore
//! observability::init()?;
//!
//! let stats: RunningStats = residuals.iter().map(|r| r.abs()).collect();
//! tracing::info!(residuals = %stats.summary(), "fit quality");
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_overweight_metrics, record_quality_metrics, RunningStats, StatsSummary,
};

/// Pretty logs to stderr at `info` unless `RUST_LOG` says otherwise.
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

/// Subscriber settings chosen by the binary
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset or unparsable
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            default_log_level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, with source location
    Json,
    #[default]
    Pretty,
    Compact,
}

/// Install the global subscriber.
///
/// Logs go to stderr so command output on stdout stays machine readable.
/// Fails if a subscriber is already installed.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    let layer = fmt::layer().with_writer(std::io::stderr);
    let layer = match config.log_format {
        LogFormat::Json => layer
            .json()
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::debug!(format = ?config.log_format, level = %config.default_log_level, "logging ready");
    Ok(())
}
