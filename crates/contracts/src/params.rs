//! Job parameters shared across crates
//!
//! Every field has a documented default so parameters are fully resolved
//! before any algorithm runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete job configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Eye-tracking synchronization
    #[serde(default)]
    pub sync: Option<SyncParams>,

    /// Event-window overweighting
    #[serde(default)]
    pub overweight: Option<OverweightParams>,

    /// Output routing
    #[serde(default)]
    pub output: OutputConfig,
}

/// Synchronization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SyncParams {
    /// Event code opening the synchronized range
    pub start_event: i64,

    /// Event code closing the synchronized range
    pub end_event: i64,

    /// Secondary columns to import (0-based)
    #[validate(length(min = 1, message = "select at least one column"))]
    pub import_columns: Vec<usize>,

    /// Labels for the imported channels, one per column
    pub new_labels: Vec<String>,

    /// Import saccade/fixation/blink events
    #[serde(default)]
    pub import_eye_events: bool,

    /// Carry free-text messages over to the merged recording
    #[serde(default = "default_true")]
    pub import_other_messages: bool,

    /// Fit the mapping over all shared events instead of the two anchors
    #[serde(default = "default_true")]
    pub do_regression: bool,

    /// Anti-alias filtering request (accepted, not performed)
    #[serde(default)]
    pub filter_eyetrack: bool,

    /// Hand the quality table to an external plotter
    #[serde(default)]
    pub plot_fig: bool,

    /// Matching tolerance in primary samples
    #[serde(default = "default_search_radius")]
    #[validate(range(min = 1, message = "search_radius must be >= 1"))]
    pub search_radius: usize,
}

impl SyncParams {
    /// Parameters with defaults for every optional field
    pub fn new(
        start_event: i64,
        end_event: i64,
        import_columns: Vec<usize>,
        new_labels: Vec<String>,
    ) -> Self {
        Self {
            start_event,
            end_event,
            import_columns,
            new_labels,
            import_eye_events: false,
            import_other_messages: true,
            do_regression: true,
            filter_eyetrack: false,
            plot_fig: false,
            search_radius: DEFAULT_SEARCH_RADIUS,
        }
    }
}

/// Default matching tolerance (samples)
pub const DEFAULT_SEARCH_RADIUS: usize = 4;

fn default_search_radius() -> usize {
    DEFAULT_SEARCH_RADIUS
}

fn default_true() -> bool {
    true
}

/// Overweighting parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct OverweightParams {
    /// Event type whose windows are duplicated
    #[validate(length(min = 1, message = "event_type cannot be empty"))]
    pub event_type: String,

    /// Window `[before, after]` relative to onset (seconds)
    pub time_window: [f64; 2],

    /// Appended length as a fraction of the original sample count
    #[validate(range(min = 0.0, message = "proportion must be >= 0"))]
    pub proportion: f64,

    /// Subtract each window's per-channel mean
    #[serde(default)]
    pub remove_window_mean: bool,
}

/// Output routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Pretty-print JSON artifacts
    #[serde(default)]
    pub pretty: bool,

    /// Also log the audit summary
    #[serde(default = "default_true")]
    pub log_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            pretty: false,
            log_summary: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}
