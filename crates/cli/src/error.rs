//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Input or configuration file not found
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// Configuration lacks the section a command needs
    #[error("Configuration {path} has no [{section}] section")]
    MissingSection { section: &'static str, path: String },

    /// At least one output sink failed
    #[error("Failed to deliver results: {message}")]
    Delivery { message: String },
}

impl CliError {
    pub fn not_found(path: &Path) -> Self {
        Self::NotFound {
            path: path.display().to_string(),
        }
    }

    pub fn missing_section(section: &'static str, path: &Path) -> Self {
        Self::MissingSection {
            section,
            path: path.display().to_string(),
        }
    }

    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}
