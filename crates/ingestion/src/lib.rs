//! # Ingestion
//!
//! Input side of the workspace.
//!
//! Responsibilities:
//! - Canonicalize event types into comparable `EventCode`s
//! - Load recordings and eye-tracking bundles from interchange files
//! - Generate synthetic sessions with a known clock relation
//!
//! ## Usage
//!
//! ```ignore
//! use ingestion::{extract_events, load_recording};
//!
//! let recording = load_recording(Path::new("subject01.json"))?;
//! let canonical = extract_events("primary", &recording.events)?;
//! ```

mod extract;
mod interchange;
mod synthetic;

// Re-exports
pub use extract::{extract_events, leading_code};
pub use interchange::{load, load_bundle, load_recording};
pub use synthetic::{
    SyntheticSession, SyntheticSessionConfig, CONSTANT_COLUMN, CONSTANT_VALUE, RAMP_COLUMN,
};
