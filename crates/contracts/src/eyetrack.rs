//! EyetrackBundle - secondary stream as handed over by the raw-format parser

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Event;

/// Eye that produced a movement event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Eye {
    #[serde(rename = "L", alias = "left")]
    Left,
    #[serde(rename = "R", alias = "right")]
    Right,
}

impl Eye {
    /// Single-letter code used in merged event labels
    pub fn code(self) -> &'static str {
        match self {
            Eye::Left => "L",
            Eye::Right => "R",
        }
    }
}

/// Eye-movement category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Saccade,
    Fixation,
    Blink,
}

impl MovementKind {
    /// Singular event name
    pub fn singular(self) -> &'static str {
        match self {
            MovementKind::Saccade => "saccade",
            MovementKind::Fixation => "fixation",
            MovementKind::Blink => "blink",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

/// One detected eye movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeMovementRow {
    pub eye: Eye,
    /// First secondary sample of the movement
    pub start: usize,
    /// Last secondary sample of the movement
    pub end: usize,
    /// Remaining per-row properties, aligned with the table's `colheader`
    #[serde(default)]
    pub values: Vec<f64>,
}

/// Movement events of one kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeMovementTable {
    pub kind: MovementKind,
    #[serde(default)]
    pub colheader: Vec<String>,
    #[serde(default)]
    pub rows: Vec<EyeMovementRow>,
}

/// Secondary-stream bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyetrackBundle {
    /// Sampling rate (Hz)
    pub srate: f64,

    /// Samples, time × columns
    pub samples: Array2<f64>,

    /// Column names, one per sample column
    pub colheader: Vec<String>,

    /// Marker events, latencies in secondary samples
    #[serde(default)]
    pub events: Vec<Event>,

    /// Parsed saccades/fixations/blinks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movements: Vec<EyeMovementTable>,

    /// Unparsed free-text messages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_messages: Vec<String>,
}

impl EyetrackBundle {
    /// Number of sample rows
    pub fn len(&self) -> usize {
        self.samples.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.nrows() == 0
    }

    /// Number of data columns
    pub fn columns(&self) -> usize {
        self.samples.ncols()
    }

    /// Whether any movement table holds rows
    pub fn has_movements(&self) -> bool {
        self.movements.iter().any(|t| !t.rows.is_empty())
    }
}
