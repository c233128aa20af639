//! Interchange file loading
//!
//! Recordings and eye-tracking bundles arrive already parsed, serialized as
//! JSON. Raw vendor formats are not read here.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use contracts::{EyetrackBundle, Recording, SyncError};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

/// Deserialize any interchange value from a `.json` file
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, SyncError> {
    let display = path.display().to_string();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => {}
        Some(ext) => {
            return Err(SyncError::interchange(
                display,
                format!("unsupported interchange format: .{ext}"),
            ))
        }
        None => return Err(SyncError::interchange(display, "missing extension")),
    }

    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| SyncError::interchange(display, e.to_string()))
}

/// Load a primary recording and check its invariants
#[instrument(name = "load_recording", skip_all, fields(path = %path.display()))]
pub fn load_recording(path: &Path) -> Result<Recording, SyncError> {
    let mut recording: Recording = load(path)?;
    recording.check_consistency()?;
    info!(
        channels = recording.nbchan(),
        samples = recording.samples(),
        srate = recording.srate,
        events = recording.events.len(),
        "recording loaded"
    );
    Ok(recording)
}

/// Load an eye-tracking bundle and check its shape
#[instrument(name = "load_bundle", skip_all, fields(path = %path.display()))]
pub fn load_bundle(path: &Path) -> Result<EyetrackBundle, SyncError> {
    let bundle: EyetrackBundle = load(path)?;
    if bundle.colheader.len() != bundle.columns() {
        return Err(SyncError::inconsistent(format!(
            "{} column headers for {} sample columns",
            bundle.colheader.len(),
            bundle.columns()
        )));
    }
    info!(
        rows = bundle.len(),
        columns = bundle.columns(),
        srate = bundle.srate,
        events = bundle.events.len(),
        movement_tables = bundle.movements.len(),
        "eye-tracking bundle loaded"
    );
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ChannelInfo, Event};
    use ndarray::Array2;
    use tempfile::tempdir;

    fn recording() -> Recording {
        let mut rec = Recording::continuous(
            250.0,
            Array2::from_elem((1, 20), 1.5),
            vec![ChannelInfo::new("Pz")],
        );
        rec.events = vec![Event::new(4, 12), Event::new("S 3", 2)];
        rec
    }

    #[test]
    fn test_load_recording_sorts_events() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.json");
        std::fs::write(&path, serde_json::to_vec(&recording()).unwrap()).unwrap();

        let loaded = load_recording(&path).unwrap();
        assert_eq!(loaded.samples(), 20);
        assert_eq!(loaded.channels[0].label, "Pz");
        assert_eq!(loaded.events[0].latency, 2);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load::<Recording>(Path::new("data.edf"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("unsupported"), "got: {err}");
    }

    #[test]
    fn test_bundle_header_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("et.json");
        let bundle = EyetrackBundle {
            srate: 500.0,
            samples: Array2::zeros((4, 2)),
            colheader: vec!["time".into()],
            events: vec![Event::new(1, 0)],
            movements: vec![],
            other_messages: vec![],
        };
        std::fs::write(&path, serde_json::to_vec(&bundle).unwrap()).unwrap();
        assert!(load_bundle(&path).is_err());
    }
}
