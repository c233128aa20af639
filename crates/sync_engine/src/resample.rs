//! Resampling of secondary columns onto the primary timeline.

use contracts::{AffineMapping, SyncError, SyncRange};
use ndarray::{Array2, ArrayView2};
use tracing::instrument;

/// Secondary columns evaluated at every primary sample of the range
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledBlock {
    pub range: SyncRange,
    /// range.len() × selected columns
    pub data: Array2<f64>,
}

/// Linear interpolation of `columns` at `mapping.invert(p)` for each `p` in `range`.
///
/// Positions before the first or after the last secondary sample are clamped
/// to the boundary value.
#[instrument(level = "debug", name = "resample", skip(samples, mapping), fields(rows = samples.nrows()))]
pub fn resample(
    samples: ArrayView2<'_, f64>,
    columns: &[usize],
    mapping: &AffineMapping,
    range: SyncRange,
) -> Result<ResampledBlock, SyncError> {
    let (rows, available) = samples.dim();
    if rows == 0 {
        return Err(SyncError::EmptyRecording {
            stream: "secondary".into(),
        });
    }
    if let Some(&column) = columns.iter().find(|&&c| c >= available) {
        return Err(SyncError::ColumnOutOfRange { column, available });
    }

    let last_row = (rows - 1) as f64;
    let mut data = Array2::zeros((range.len(), columns.len()));

    for (offset, primary) in (range.first..=range.last).enumerate() {
        let position = mapping.invert(primary as f64).clamp(0.0, last_row);
        let lower = position.floor() as usize;
        let upper = (lower + 1).min(rows - 1);
        let frac = position - lower as f64;

        for (target, &column) in columns.iter().enumerate() {
            let v0 = samples[[lower, column]];
            data[[offset, target]] = if frac == 0.0 {
                v0
            } else {
                v0 + frac * (samples[[upper, column]] - v0)
            };
        }
    }

    Ok(ResampledBlock { range, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn ramp(rows: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, 2), |(r, c)| if c == 0 { r as f64 } else { 5.0 })
    }

    #[test]
    fn test_identity_copies_samples() {
        let samples = array![[1.0, f64::NAN], [2.0, 7.0], [3.0, 8.0]];
        let block = resample(
            samples.view(),
            &[0, 1],
            &AffineMapping::IDENTITY,
            SyncRange { first: 0, last: 2 },
        )
        .unwrap();
        assert_eq!(block.data.column(0).to_vec(), vec![1.0, 2.0, 3.0]);
        assert!(block.data[[0, 1]].is_nan());
        assert_eq!(block.data[[2, 1]], 8.0);
    }

    #[test]
    fn test_half_rate_interpolation() {
        // primary = 0.5 * secondary, so primary p reads secondary 2p
        let samples = ramp(100);
        let mapping = AffineMapping {
            slope: 0.5,
            intercept: 0.0,
        };
        let block = resample(samples.view(), &[0], &mapping, SyncRange { first: 5, last: 10 }).unwrap();
        for (offset, value) in block.data.column(0).iter().enumerate() {
            assert_abs_diff_eq!(*value, 2.0 * (5 + offset) as f64, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_fractional_position() {
        let samples = ramp(10);
        let mapping = AffineMapping {
            slope: 1.0,
            intercept: -0.25,
        };
        let block = resample(samples.view(), &[0], &mapping, SyncRange { first: 2, last: 2 }).unwrap();
        assert_abs_diff_eq!(block.data[[0, 0]], 2.25, epsilon = 1e-12);
    }

    #[test]
    fn test_clamps_past_end() {
        let samples = ramp(4);
        let block = resample(
            samples.view(),
            &[0],
            &AffineMapping::IDENTITY,
            SyncRange { first: 2, last: 6 },
        )
        .unwrap();
        assert_eq!(block.data.column(0).to_vec(), vec![2.0, 3.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_column_out_of_range() {
        let samples = ramp(4);
        let err = resample(
            samples.view(),
            &[0, 2],
            &AffineMapping::IDENTITY,
            SyncRange { first: 0, last: 1 },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SyncError::ColumnOutOfRange {
                column: 2,
                available: 2
            }
        ));
    }
}
