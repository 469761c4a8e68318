//! 0-100 quality score.
//!
//! `completeness = (cells - missing) / cells * 100` and
//! `penalty = outliers / cells * 100`, where `cells` counts every cell of the
//! table (numeric or not). The score is `round(completeness - penalty)`
//! clamped to `[0, 100]`.

use crate::quality::{MissingRef, OutlierRef};
use crate::table::Table;

/// Score a table from its detection results.
///
/// A table without cells scores 0.
pub fn quality_score(table: &Table, missing: &[MissingRef], outliers: &[OutlierRef]) -> u8 {
    score_from_counts(table.total_cells(), missing.len(), outliers.len())
}

/// Score from raw counts.
pub fn score_from_counts(total_cells: usize, missing: usize, outliers: usize) -> u8 {
    if total_cells == 0 {
        return 0;
    }
    let total = total_cells as f64;
    let completeness = (total - missing as f64) / total * 100.0;
    let penalty = outliers as f64 / total * 100.0;
    (completeness - penalty).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_table_scores_100() {
        assert_eq!(score_from_counts(12, 0, 0), 100);
    }

    #[test]
    fn test_all_missing_scores_0() {
        assert_eq!(score_from_counts(12, 12, 0), 0);
    }

    #[test]
    fn test_penalty_uses_all_cells() {
        // 20 cells, 2 missing, 1 outlier: 90 - 5 = 85
        assert_eq!(score_from_counts(20, 2, 1), 85);
    }

    #[test]
    fn test_rounding() {
        // 3 cells, 1 missing: 66.67 -> 67
        assert_eq!(score_from_counts(3, 1, 0), 67);
    }

    #[test]
    fn test_clamped_at_zero() {
        assert_eq!(score_from_counts(4, 3, 3), 0);
    }

    #[test]
    fn test_empty_table_scores_zero() {
        assert_eq!(score_from_counts(0, 0, 0), 0);
        assert_eq!(quality_score(&Table::default(), &[], &[]), 0);
    }
}
