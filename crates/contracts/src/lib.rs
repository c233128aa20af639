//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Index Model
//! - All positions are 0-based sample indices into their own stream
//! - The primary recording's timeline is the output timeline

mod error;
mod eyetrack;
mod params;
mod recording;
mod sync;

pub use error::*;
pub use eyetrack::*;
pub use params::*;
pub use recording::*;
pub use sync::*;
