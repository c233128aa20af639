//! FileSink - writes job artifacts into an output directory

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use contracts::OutputConfig;
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::error::DispatcherError;
use crate::report::{JobReport, OutputSink};

/// Quality table file name
pub const QUALITY_FILE: &str = "sync_quality.json";
/// Audit summary file name
pub const SUMMARY_FILE: &str = "summary.txt";

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
    /// Pretty-print JSON artifacts
    pub pretty: bool,
}

impl FileSinkConfig {
    /// Create config from the job's output section
    pub fn from_output(output: &OutputConfig) -> Self {
        Self {
            base_path: output.dir.clone(),
            pretty: output.pretty,
        }
    }
}

/// Sink that writes recordings, quality tables and summaries to disk
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    /// summary.txt is truncated on the first write of this sink, appended after
    summary_started: bool,
    written: Vec<PathBuf>,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        // Create base directory if it doesn't exist
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            summary_started: false,
            written: Vec::new(),
        })
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// `<recording>_<job>.json` with the name reduced to filesystem-safe characters
    fn recording_path(&self, report: &JobReport<'_>) -> PathBuf {
        let stem: String = report
            .recording
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let stem = if stem.is_empty() { "recording" } else { &stem };
        self.config
            .base_path
            .join(format!("{stem}_{}.json", report.kind))
    }

    fn write_json<T: Serialize>(&mut self, path: PathBuf, value: &T) -> Result<(), DispatcherError> {
        let mut writer = BufWriter::new(File::create(&path)?);
        let result = if self.config.pretty {
            serde_json::to_writer_pretty(&mut writer, value)
        } else {
            serde_json::to_writer(&mut writer, value)
        };
        result.map_err(|source| DispatcherError::Serialize {
            path: path.clone(),
            source,
        })?;
        writer.flush()?;
        debug!(sink = %self.name, path = %path.display(), "artifact written");
        self.written.push(path);
        Ok(())
    }

    fn write_summary(&mut self, report: &JobReport<'_>) -> Result<(), DispatcherError> {
        let path = self.config.base_path.join(SUMMARY_FILE);
        let mut file = if self.summary_started {
            OpenOptions::new().append(true).create(true).open(&path)?
        } else {
            File::create(&path)?
        };
        self.summary_started = true;

        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        writeln!(file, "# eyesync {} summary ({stamp})", report.kind)?;
        writeln!(file)?;
        write!(file, "{}", report.summary)?;
        if !report.summary.ends_with('\n') {
            writeln!(file)?;
        }
        writeln!(file)?;

        if !self.written.contains(&path) {
            self.written.push(path);
        }
        Ok(())
    }

    fn persist(&mut self, report: &JobReport<'_>) -> Result<(), DispatcherError> {
        let recording_path = self.recording_path(report);
        self.write_json(recording_path, report.recording)?;
        if let Some(quality) = report.quality {
            let path = self.config.base_path.join(QUALITY_FILE);
            self.write_json(path, quality)?;
        }
        self.write_summary(report)
    }
}

impl OutputSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, report),
        fields(sink = %self.name, job = %report.kind)
    )]
    fn write(&mut self, report: &JobReport<'_>) -> Result<(), DispatcherError> {
        self.persist(report).inspect_err(|e| {
            error!(sink = %self.name, error = %e, "Write failed");
        })
    }
}
