//! Configuration validation
//!
//! Rules:
//! - at least one of `[sync]` / `[overweight]` present
//! - field-level rules declared on the parameter structs (search_radius >= 1, proportion >= 0, ...)
//! - one label per imported column, labels non-empty
//! - overweight window `before < after`, both finite

use contracts::{JobConfig, OverweightParams, SyncError, SyncParams};
use validator::{Validate, ValidationErrors};

/// Validate a JobConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &JobConfig) -> Result<(), SyncError> {
    if config.sync.is_none() && config.overweight.is_none() {
        return Err(SyncError::config_validation(
            "sync / overweight",
            "configuration defines neither a sync nor an overweight section",
        ));
    }
    if let Some(sync) = &config.sync {
        validate_sync(sync)?;
    }
    if let Some(overweight) = &config.overweight {
        validate_overweight(overweight)?;
    }
    Ok(())
}

/// Validate synchronization parameters
pub fn validate_sync(params: &SyncParams) -> Result<(), SyncError> {
    params
        .validate()
        .map_err(|errors| field_error("sync", &errors))?;

    if params.new_labels.len() != params.import_columns.len() {
        return Err(SyncError::config_validation(
            "sync.new_labels",
            format!(
                "{} labels for {} import_columns",
                params.new_labels.len(),
                params.import_columns.len()
            ),
        ));
    }

    if let Some(idx) = params.new_labels.iter().position(|l| l.trim().is_empty()) {
        return Err(SyncError::config_validation(
            format!("sync.new_labels[{idx}]"),
            "channel label cannot be empty",
        ));
    }

    Ok(())
}

/// Validate overweighting parameters
pub fn validate_overweight(params: &OverweightParams) -> Result<(), SyncError> {
    params
        .validate()
        .map_err(|errors| field_error("overweight", &errors))?;

    let [before, after] = params.time_window;
    if !(before.is_finite() && after.is_finite()) || before >= after {
        return Err(SyncError::config_validation(
            "overweight.time_window",
            format!("time_window must satisfy before < after, got [{before}, {after}]"),
        ));
    }
    if !params.proportion.is_finite() {
        return Err(SyncError::config_validation(
            "overweight.proportion",
            "proportion must be finite",
        ));
    }

    Ok(())
}

fn field_error(section: &str, errors: &ValidationErrors) -> SyncError {
    let first = errors.field_errors().into_iter().next().map(|(field, errs)| {
        let message = errs
            .first()
            .and_then(|e| e.message.as_ref())
            .map(|m| m.to_string())
            .unwrap_or_else(|| "invalid value".to_string());
        (field.to_string(), message)
    });

    match first {
        Some((field, message)) => SyncError::config_validation(format!("{section}.{field}"), message),
        None => SyncError::config_validation(section, errors.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::OutputConfig;

    fn sync_params() -> SyncParams {
        SyncParams::new(103, 203, vec![1, 2], vec!["gaze_x".into(), "gaze_y".into()])
    }

    fn overweight_params() -> OverweightParams {
        OverweightParams {
            event_type: "R_fixation".into(),
            time_window: [-0.1, 0.4],
            proportion: 0.5,
            remove_window_mean: true,
        }
    }

    fn config() -> JobConfig {
        JobConfig {
            sync: Some(sync_params()),
            overweight: Some(overweight_params()),
            output: OutputConfig::default(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&config()).is_ok());
    }

    #[test]
    fn test_empty_config() {
        let err = validate(&JobConfig::default()).unwrap_err().to_string();
        assert!(err.contains("neither"), "got: {err}");
    }

    #[test]
    fn test_label_count_mismatch() {
        let mut cfg = config();
        cfg.sync.as_mut().unwrap().new_labels.pop();
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("1 labels for 2 import_columns"), "got: {err}");
    }

    #[test]
    fn test_blank_label() {
        let mut cfg = config();
        cfg.sync.as_mut().unwrap().new_labels[1] = "  ".into();
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_zero_search_radius() {
        let mut cfg = config();
        cfg.sync.as_mut().unwrap().search_radius = 0;
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("search_radius"), "got: {err}");
    }

    #[test]
    fn test_no_columns() {
        let mut cfg = config();
        let sync = cfg.sync.as_mut().unwrap();
        sync.import_columns.clear();
        sync.new_labels.clear();
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("at least one column"), "got: {err}");
    }

    #[test]
    fn test_inverted_time_window() {
        let mut cfg = config();
        cfg.overweight.as_mut().unwrap().time_window = [0.4, -0.1];
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("before < after"), "got: {err}");
    }

    #[test]
    fn test_negative_proportion() {
        let mut cfg = config();
        cfg.overweight.as_mut().unwrap().proportion = -1.0;
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("proportion"), "got: {err}");
    }
}
