//! Sync-quality table.

use contracts::{AffineMapping, AlignmentMode, EventPair, SyncQualityReport, SyncQualityRow};
use observability::RunningStats;

/// Residual of every pair under the final mapping.
///
/// Regression reports every matched pair, two-point mode the two anchors.
pub fn estimate_quality(
    pairs: &[EventPair],
    mapping: &AffineMapping,
    mode: AlignmentMode,
) -> SyncQualityReport {
    let rows: Vec<SyncQualityRow> = pairs
        .iter()
        .map(|pair| {
            let predicted = mapping.apply(pair.secondary as f64);
            SyncQualityRow {
                code: pair.code,
                primary: pair.primary,
                secondary: pair.secondary,
                predicted,
                residual: pair.primary as f64 - predicted,
                ambiguous: pair.ambiguous,
            }
        })
        .collect();

    let stats: RunningStats = rows.iter().map(|r| r.residual.abs()).collect();
    let (mean_abs_residual, max_abs_residual) = if stats.count() == 0 {
        (0.0, 0.0)
    } else {
        (stats.mean(), stats.max())
    };

    SyncQualityReport {
        mode,
        ambiguous_count: rows.iter().filter(|r| r.ambiguous).count(),
        rows,
        mean_abs_residual,
        max_abs_residual,
    }
}
