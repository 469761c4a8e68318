//! Outlier resolution.
//!
//! Applies a remediation to the references produced by the latest detection
//! pass. References are validated against the table before anything changes,
//! so a stale list is rejected instead of partially applied.

use super::Resolution;
use crate::config::{AnalysisConfig, OutlierStrategy};
use crate::error::{CleaningError, Result};
use crate::quality::{OutlierBounds, OutlierRef};
use crate::table::{CellValue, ChangedCells, Table};
use crate::utils::{ceil_to, floor_to, format_fixed, format_number, parse_numeric_str};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Handles outlier treatment.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Resolve `outliers` in `table` with `method`.
    ///
    /// - `Delete` drops every referenced row in one pass over the input.
    /// - `Cap` replaces each referenced cell with the bound it crossed,
    ///   written with `fill_precision` decimals. A value on or inside its
    ///   bounds is left alone.
    ///
    /// Fails with `StaleReference` if a reference points outside the table
    /// or at a cell whose value no longer matches.
    pub fn resolve_outliers(
        table: &Table,
        outliers: &[OutlierRef],
        method: OutlierStrategy,
        config: &AnalysisConfig,
    ) -> Result<Resolution> {
        let columns = Self::validate(table, outliers)?;

        if outliers.is_empty() {
            debug!("No outliers to resolve");
            return Ok(Resolution::unchanged(table));
        }

        match method {
            OutlierStrategy::Delete => {
                let rows: BTreeSet<usize> = outliers.iter().map(|o| o.row).collect();
                info!("Removed {} rows containing outliers", rows.len());
                Ok(Resolution {
                    table: table.without_rows(&rows),
                    changed: ChangedCells::new(),
                    rows_removed: rows.len(),
                })
            }
            OutlierStrategy::Cap => {
                let mut result = table.clone();
                let mut changed = ChangedCells::new();

                for (outlier, idx) in outliers.iter().zip(columns) {
                    if let Some(capped) = outlier.bounds.cap(outlier.value) {
                        result.set_cell(
                            outlier.row,
                            idx,
                            CellValue::Text(Self::capped_text(
                                capped,
                                &outlier.bounds,
                                config.fill_precision,
                            )),
                        );
                        changed.mark(outlier.row, outlier.column.clone());
                    }
                }

                info!("Capped {} outliers at IQR bounds", changed.len());
                Ok(Resolution {
                    table: result,
                    changed,
                    rows_removed: 0,
                })
            }
        }
    }

    /// Text written for a capped cell.
    ///
    /// The bound is rounded toward the inside of the fences so the written
    /// value never lies outside them. When no `precision`-decimal value fits
    /// (fences narrower than the grid), the exact bound is written instead.
    fn capped_text(bound: f64, bounds: &OutlierBounds, precision: usize) -> String {
        let rounded = if bound >= bounds.upper {
            floor_to(bound, precision)
        } else {
            ceil_to(bound, precision)
        };
        let text = format_fixed(rounded, precision);
        match parse_numeric_str(&text) {
            Some(v) if !bounds.is_outside(v) => text,
            _ => format_number(bound),
        }
    }

    /// Check each reference against the table; returns the column index of
    /// each reference in order.
    fn validate(table: &Table, outliers: &[OutlierRef]) -> Result<Vec<usize>> {
        outliers
            .iter()
            .map(|o| {
                let idx = table.column_index(&o.column).ok_or_else(|| {
                    CleaningError::StaleReference(format!("column '{}' does not exist", o.column))
                })?;
                let current = table
                    .rows()
                    .get(o.row)
                    .and_then(|row| row[idx].as_number());
                if current != Some(o.value) {
                    return Err(CleaningError::StaleReference(format!(
                        "row {} of '{}' no longer holds {}",
                        o.row, o.column, o.value
                    )));
                }
                Ok(idx)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::{OutlierBounds, find_outliers};
    use crate::table::test_support::*;

    fn values() -> Table {
        numeric_column("v", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0])
    }

    #[test]
    fn test_cap_replaces_with_upper_bound() {
        let t = values();
        let config = AnalysisConfig::default();
        let outliers = find_outliers(&t, "v", &config);

        let res = OutlierHandler::resolve_outliers(&t, &outliers, OutlierStrategy::Cap, &config)
            .unwrap();
        assert_eq!(res.table.cell(9, "v"), Some(&CellValue::from("15.50")));
        assert!(res.changed.contains(9, "v"));
        assert_eq!(res.table.row_count(), 10);
    }

    #[test]
    fn test_cap_lower_bound() {
        let t = numeric_column("v", &[-100.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let config = AnalysisConfig::default();
        let outliers = find_outliers(&t, "v", &config);
        assert_eq!(outliers.len(), 1);

        let res = OutlierHandler::resolve_outliers(&t, &outliers, OutlierStrategy::Cap, &config)
            .unwrap();
        // sorted: Q1 = idx 2 -> 2, Q3 = idx 7 -> 7, IQR = 5, lower = -5.5
        assert_eq!(res.table.cell(0, "v"), Some(&CellValue::from("-5.50")));
    }

    #[test]
    fn test_cap_with_fractional_bounds_stays_inside() {
        let t = numeric_column("v", &[0.0, 0.25, 0.25, 0.5, 0.5, 0.5, 0.5, 10.0]);
        let config = AnalysisConfig::default();
        let outliers = find_outliers(&t, "v", &config);
        assert_eq!(outliers.len(), 1);
        let bounds = outliers[0].bounds;
        // Q1 = 0.25, Q3 = 0.5, IQR = 0.25
        assert_eq!((bounds.lower, bounds.upper), (-0.125, 0.875));

        let res = OutlierHandler::resolve_outliers(&t, &outliers, OutlierStrategy::Cap, &config)
            .unwrap();
        assert_eq!(res.table.cell(7, "v"), Some(&CellValue::from("0.87")));
        for (_, value) in res.table.numeric_values(0) {
            assert!(!bounds.is_outside(value));
        }
    }

    #[test]
    fn test_cap_lower_fractional_bound_rounds_up() {
        let bounds = OutlierBounds {
            lower: -0.125,
            upper: 0.875,
        };
        assert_eq!(OutlierHandler::capped_text(-0.125, &bounds, 2), "-0.12");
    }

    #[test]
    fn test_cap_falls_back_to_exact_bound_when_grid_too_coarse() {
        let bounds = OutlierBounds {
            lower: 0.125,
            upper: 0.125,
        };
        assert_eq!(OutlierHandler::capped_text(0.125, &bounds, 2), "0.125");
    }

    #[test]
    fn test_cap_leaves_values_within_bounds() {
        let t = numeric_column("v", &[1.0, 2.0, 3.0, 4.0]);
        let inside = OutlierRef {
            row: 3,
            column: "v".to_string(),
            value: 4.0,
            bounds: OutlierBounds {
                lower: 0.0,
                upper: 4.0,
            },
        };
        let res = OutlierHandler::resolve_outliers(
            &t,
            &[inside],
            OutlierStrategy::Cap,
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(res.table, t);
        assert!(res.changed.is_empty());
    }

    #[test]
    fn test_delete_removes_flagged_rows() {
        let t = values();
        let config = AnalysisConfig::default();
        let outliers = find_outliers(&t, "v", &config);

        let res =
            OutlierHandler::resolve_outliers(&t, &outliers, OutlierStrategy::Delete, &config)
                .unwrap();
        assert_eq!(res.rows_removed, 1);
        assert_eq!(res.table.row_count(), 9);
    }

    #[test]
    fn test_stale_reference_rejected() {
        let t = values();
        let config = AnalysisConfig::default();
        let outliers = find_outliers(&t, "v", &config);

        // drop the first row: indices shift and the ref now points at nothing
        let shifted = t.without_rows(&BTreeSet::from([0]));
        let err =
            OutlierHandler::resolve_outliers(&shifted, &outliers, OutlierStrategy::Cap, &config)
                .unwrap_err();
        assert_eq!(err.error_code(), "STALE_REFERENCE");
    }

    #[test]
    fn test_unknown_column_rejected() {
        let t = values();
        let bogus = OutlierRef {
            row: 0,
            column: "w".to_string(),
            value: 1.0,
            bounds: OutlierBounds {
                lower: 0.0,
                upper: 0.5,
            },
        };
        let result = OutlierHandler::resolve_outliers(
            &t,
            &[bogus],
            OutlierStrategy::Delete,
            &AnalysisConfig::default(),
        );
        assert!(result.is_err());
    }
}
