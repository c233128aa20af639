//! Recording - primary (EEG) data model
//!
//! Continuous or epoched multichannel data with a channel table and a typed event list.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{SyncError, SyncQualityReport};

/// Channel type marker for imported gaze channels
pub const EYE_CHANNEL_KIND: &str = "EYE";

/// Event type as written by the recording system
///
/// Numeric marker codes and free-text labels (which may embed a code,
/// e.g. `"S 12"`) both occur in practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventType {
    /// Numeric marker code
    Code(i64),
    /// Free-text label
    Label(String),
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Code(code) => write!(f, "{code}"),
            EventType::Label(label) => f.write_str(label),
        }
    }
}

impl From<i64> for EventType {
    fn from(code: i64) -> Self {
        Self::Code(code)
    }
}

impl From<&str> for EventType {
    fn from(label: &str) -> Self {
        Self::Label(label.to_string())
    }
}

/// Canonical comparable event key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventCode(pub i64);

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event with canonical code, ready for matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub code: EventCode,
    /// Sample index in the owning stream
    pub sample: usize,
}

/// Annotated event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type
    #[serde(rename = "type")]
    pub kind: EventType,

    /// Onset sample index (0-based)
    pub latency: usize,

    /// Duration in samples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<usize>,

    /// Extra per-event fields (eye-movement properties etc.)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, f64>,
}

impl Event {
    /// Create an event without duration or fields
    pub fn new(kind: impl Into<EventType>, latency: usize) -> Self {
        Self {
            kind: kind.into(),
            latency,
            duration: None,
            fields: BTreeMap::new(),
        }
    }
}

/// Channel descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub label: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl ChannelInfo {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            reference: String::new(),
            kind: String::new(),
        }
    }
}

/// Primary recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Dataset name (diagnostics only)
    #[serde(default)]
    pub name: String,

    /// Sampling rate (Hz)
    pub srate: f64,

    /// Samples per trial
    pub pnts: usize,

    /// Trial count (1 = continuous)
    #[serde(default = "default_trials")]
    pub trials: usize,

    /// Data, channels × (pnts · trials)
    pub data: Array2<f64>,

    /// Channel table, one entry per data row
    pub channels: Vec<ChannelInfo>,

    /// Event list
    #[serde(default)]
    pub events: Vec<Event>,

    /// Free-text messages carried over from the secondary stream
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_messages: Vec<String>,

    /// Alignment diagnostics attached by the sync engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_quality: Option<SyncQualityReport>,
}

fn default_trials() -> usize {
    1
}

impl Recording {
    /// Create a continuous recording
    pub fn continuous(srate: f64, data: Array2<f64>, channels: Vec<ChannelInfo>) -> Self {
        let pnts = data.ncols();
        Self {
            name: String::new(),
            srate,
            pnts,
            trials: 1,
            data,
            channels,
            events: Vec::new(),
            other_messages: Vec::new(),
            sync_quality: None,
        }
    }

    /// Number of channels
    pub fn nbchan(&self) -> usize {
        self.data.nrows()
    }

    /// Total samples across all trials
    pub fn samples(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_epoched(&self) -> bool {
        self.trials > 1
    }

    /// Reinterpret epoched data as one continuous trial
    ///
    /// Trials are already stored back to back, so only the bookkeeping changes.
    pub fn flatten(mut self) -> Self {
        self.pnts *= self.trials.max(1);
        self.trials = 1;
        self
    }

    /// Validate structural invariants and sort events by latency.
    ///
    /// The sort is stable so events at the same sample keep their order.
    pub fn check_consistency(&mut self) -> Result<(), SyncError> {
        self.validate()?;
        self.events.sort_by_key(|e| e.latency);
        Ok(())
    }

    /// Structural checks of [`Recording::check_consistency`] without reordering events.
    pub fn validate(&self) -> Result<(), SyncError> {
        if !(self.srate.is_finite() && self.srate > 0.0) {
            return Err(SyncError::inconsistent(format!(
                "sampling rate must be > 0, got {}",
                self.srate
            )));
        }
        if self.channels.len() != self.nbchan() {
            return Err(SyncError::inconsistent(format!(
                "{} channel descriptors for {} data rows",
                self.channels.len(),
                self.nbchan()
            )));
        }
        if self.pnts * self.trials.max(1) != self.samples() {
            return Err(SyncError::inconsistent(format!(
                "pnts ({}) x trials ({}) != {} samples",
                self.pnts,
                self.trials,
                self.samples()
            )));
        }
        let samples = self.samples();
        if let Some(event) = self.events.iter().find(|e| e.latency >= samples) {
            return Err(SyncError::inconsistent(format!(
                "event '{}' at sample {} outside [0, {})",
                event.kind, event.latency, samples
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn recording() -> Recording {
        let mut rec = Recording::continuous(
            100.0,
            Array2::zeros((2, 50)),
            vec![ChannelInfo::new("Fz"), ChannelInfo::new("Cz")],
        );
        rec.events = vec![Event::new(2, 30), Event::new("S 1", 10)];
        rec
    }

    #[test]
    fn test_check_consistency_sorts_events() {
        let mut rec = recording();
        rec.check_consistency().unwrap();
        assert_eq!(rec.events[0].latency, 10);
        assert_eq!(rec.events[1].latency, 30);
    }

    #[test]
    fn test_validate_keeps_event_order() {
        let rec = recording();
        rec.validate().unwrap();
        assert_eq!(rec.events[0].latency, 30);
    }

    #[test]
    fn test_check_consistency_rejects_event_out_of_range() {
        let mut rec = recording();
        rec.events.push(Event::new(9, 50));
        let err = rec.check_consistency().unwrap_err().to_string();
        assert!(err.contains("outside"), "got: {err}");
    }

    #[test]
    fn test_check_consistency_rejects_channel_mismatch() {
        let mut rec = recording();
        rec.channels.pop();
        assert!(rec.check_consistency().is_err());
    }

    #[test]
    fn test_flatten_epoched() {
        let mut rec = recording();
        rec.pnts = 25;
        rec.trials = 2;
        let flat = rec.flatten();
        assert_eq!(flat.pnts, 50);
        assert_eq!(flat.trials, 1);
        assert!(!flat.is_epoched());
    }

    #[test]
    fn test_event_type_untagged_json() {
        let events: Vec<Event> =
            serde_json::from_str(r#"[{"type": 12, "latency": 3}, {"type": "S 12", "latency": 4}]"#)
                .unwrap();
        assert_eq!(events[0].kind, EventType::Code(12));
        assert_eq!(events[1].kind, EventType::Label("S 12".into()));
        assert_eq!(events[1].to_owned().kind.to_string(), "S 12");
    }
}
