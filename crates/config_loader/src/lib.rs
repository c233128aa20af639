//! # Config Loader
//!
//! Job file loading for eyesync.
//!
//! A job file holds optional `[sync]` and `[overweight]` sections and an
//! `[output]` section. Loading parses TOML or JSON, applies serde defaults,
//! then runs the field and cross-field rules before handing back a `JobConfig`.
//!
//! ## Usage
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("job.toml")).unwrap();
//! if let Some(sync) = &config.sync {
//!     println!("anchors: {} -> {}", sync.start_event, sync.end_event);
//! }
//! ```

mod parser;
mod validator;

pub use contracts::JobConfig;
pub use parser::ConfigFormat;
pub use validator::{validate_overweight, validate_sync};

use contracts::SyncError;
use std::path::Path;

/// Entry point for reading eyesync job files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse and validate a job file.
    ///
    /// The format follows the extension: `.toml` or `.json`. Fails with
    /// `ConfigParse` for unknown extensions or malformed content, `Io` when
    /// the file cannot be read, and `ConfigValidation` when a rule is broken.
    pub fn load_from_path(path: &Path) -> Result<JobConfig, SyncError> {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                SyncError::config_parse(format!("{} has no file extension", path.display()))
            })
            .and_then(|ext| {
                ConfigFormat::from_extension(ext).ok_or_else(|| {
                    SyncError::config_parse(format!("unsupported job file type .{ext}"))
                })
            })?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Parse and validate job content already in memory.
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<JobConfig, SyncError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    pub fn to_toml(config: &JobConfig) -> Result<String, SyncError> {
        toml::to_string_pretty(config)
            .map_err(|e| SyncError::config_parse(format!("cannot write job as TOML: {e}")))
    }

    pub fn to_json(config: &JobConfig) -> Result<String, SyncError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| SyncError::config_parse(format!("cannot write job as JSON: {e}")))
    }
}
