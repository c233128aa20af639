//! # Sync Engine
//!
//! Aligns an eye-tracking stream to a primary EEG recording using shared
//! marker events and merges the resampled gaze channels into it.
//!
//! Stages:
//! - event matching on canonical codes
//! - two-point or least-squares sample-index mapping
//! - linear resampling onto the primary timeline
//! - channel, eye-event and message merge
//! - sync-quality table
//!
//! ## Usage
//!
//! ```ignore
//! use sync_engine::EyeSyncEngine;
//!
//! let params = SyncParams::new(103, 203, vec![1, 2], vec!["gaze_x".into(), "pupil".into()]);
//! let outcome = EyeSyncEngine::new(params).synchronize(&recording, &bundle)?;
//! println!("{}", outcome.summary);
//! ```

mod aligner;
mod engine;
mod labels;
mod matcher;
mod merge;
mod quality;
mod resample;

pub use aligner::{fit_least_squares, match_events, Aligner, Alignment};
pub use engine::{EyeSyncEngine, SyncOutcome, SyncSummary};
pub use labels::sanitize_label;
pub use matcher::{shared_codes, CodeCount, EventInventory};
pub use merge::{merge, MergeOptions, MergeStats};
pub use quality::estimate_quality;
pub use resample::{resample, ResampledBlock};

// Re-export contracts types
pub use contracts::{AffineMapping, AlignmentMode, SyncParams, SyncQualityReport, SyncRange};
