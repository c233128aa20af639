//! Alignment contracts - Sync Engine output
//!
//! Sample-index mapping, synchronized range and sync-quality diagnostics.

use serde::{Deserialize, Serialize};

use crate::EventCode;

/// Affine map from secondary sample index to primary sample index
///
/// `primary = slope * secondary + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMapping {
    pub slope: f64,
    pub intercept: f64,
}

impl AffineMapping {
    pub const IDENTITY: Self = Self {
        slope: 1.0,
        intercept: 0.0,
    };

    /// Exact mapping through two (secondary, primary) pairs.
    ///
    /// Returns `None` when both secondary positions coincide.
    pub fn from_anchors(start: (f64, f64), end: (f64, f64)) -> Option<Self> {
        let (x0, y0) = start;
        let (x1, y1) = end;
        let dx = x1 - x0;
        if dx == 0.0 || !dx.is_finite() {
            return None;
        }
        let slope = (y1 - y0) / dx;
        Some(Self {
            slope,
            intercept: y0 - slope * x0,
        })
    }

    /// Secondary index → primary index
    #[inline]
    pub fn apply(&self, secondary: f64) -> f64 {
        self.slope * secondary + self.intercept
    }

    /// Primary index → secondary index
    #[inline]
    pub fn invert(&self, primary: f64) -> f64 {
        (primary - self.intercept) / self.slope
    }
}

/// How the mapping was estimated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentMode {
    /// Exact fit through the start and end anchors
    TwoPoint,
    /// Least squares over all matched shared events
    #[default]
    Regression,
}

/// Primary sample range receiving secondary data (inclusive on both ends)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRange {
    /// Primary sample of the start anchor
    pub first: usize,
    /// Primary sample of the end anchor
    pub last: usize,
}

impl SyncRange {
    #[inline]
    pub fn contains(&self, sample: usize) -> bool {
        sample >= self.first && sample <= self.last
    }

    /// Number of samples in the range
    #[inline]
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }
}

/// Matched event pair used for fitting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventPair {
    pub code: EventCode,
    /// Sample index in the primary recording
    pub primary: usize,
    /// Sample index in the secondary stream
    pub secondary: usize,
    /// More than one candidate was inside the search radius
    pub ambiguous: bool,
}

/// One row of the sync-quality table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncQualityRow {
    pub code: EventCode,
    pub primary: usize,
    pub secondary: usize,
    /// Mapped secondary position in primary samples
    pub predicted: f64,
    /// `primary - predicted` (samples)
    pub residual: f64,
    pub ambiguous: bool,
}

/// Sync-quality table plus summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncQualityReport {
    pub mode: AlignmentMode,
    pub rows: Vec<SyncQualityRow>,
    /// Mean absolute residual (samples)
    pub mean_abs_residual: f64,
    /// Largest absolute residual (samples)
    pub max_abs_residual: f64,
    /// Pairs matched with more than one candidate in range
    pub ambiguous_count: usize,
}
