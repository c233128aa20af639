//! Layered error definitions
//!
//! Categorized by source: config / precondition / alignment / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum SyncError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Precondition Errors =====
    /// Recording carries no samples
    #[error("recording '{stream}' contains no samples")]
    EmptyRecording { stream: String },

    /// Synchronization requires continuous primary data
    #[error("primary recording is epoched ({trials} trials); synchronize continuous data")]
    EpochedPrimary { trials: usize },

    /// Event list is missing
    #[error("no events found in {stream}")]
    NoEvents { stream: String },

    /// No event code occurs in both streams
    #[error("no shared event types between primary and secondary streams")]
    NoSharedEvents,

    /// Selected anchor is not in the shared set
    #[error("anchor event {code} is not shared by both streams")]
    AnchorNotShared { code: i64 },

    /// Anchors do not span a positive range
    #[error("anchor events in {stream} do not span a positive range: first={first}, last={last}")]
    DegenerateAnchors {
        stream: String,
        first: usize,
        last: usize,
    },

    /// Column index outside the secondary stream
    #[error("column {column} out of range: secondary stream has {available} columns")]
    ColumnOutOfRange { column: usize, available: usize },

    /// Labels do not line up with the column selection
    #[error("{labels} channel labels supplied for {columns} imported columns")]
    LabelCountMismatch { labels: usize, columns: usize },

    /// Invalid caller parameter
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// Recording violates its structural invariants
    #[error("inconsistent recording: {message}")]
    InconsistentRecording { message: String },

    // ===== Alignment Errors =====
    /// Too few matched event pairs to fit a mapping
    #[error("regression needs at least 2 matched event pairs at distinct positions, found {found}")]
    InsufficientMatches { found: usize },

    /// Overweighting produced nothing to tile
    #[error("no complete '{event_type}' windows to overweight ({occurrences} occurrences)")]
    EmptyOverweightWindow {
        event_type: String,
        occurrences: usize,
    },

    // ===== General Errors =====
    /// Interchange (de)serialization error
    #[error("interchange error for '{path}': {message}")]
    Interchange { path: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid parameter error
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create inconsistent recording error
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::InconsistentRecording {
            message: message.into(),
        }
    }

    /// Create interchange error
    pub fn interchange(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Interchange {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SyncError>;
