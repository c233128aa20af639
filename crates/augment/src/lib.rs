//! # Augment
//!
//! Event-window overweighting: windows around a chosen event type are cut out,
//! tiled to a requested length and appended to the end of the recording, so
//! that a downstream decomposition gives those periods more weight.

mod overweight;

pub use overweight::{OverweightOutcome, Overweighter};

// Re-export contracts types
pub use contracts::OverweightParams;
