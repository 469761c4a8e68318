//! Statistical imputation methods.
//!
//! Provides row deletion and mean, median, and mode fills for missing cells.

use super::Resolution;
use crate::config::{AnalysisConfig, MissingStrategy};
use crate::profiler::{ColumnType, infer_column_type};
use crate::quality::find_missing;
use crate::table::{CellValue, ChangedCells, Table};
use crate::utils::{format_fixed, mean, median_sorted, round_to, sort_floats};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Resolve every missing cell of `table` with `method`.
    ///
    /// Returns a new table; the input is never touched.
    ///
    /// - `Delete` drops each row holding at least one missing cell. Rows are
    ///   collected against the input table first and dropped in one pass.
    /// - `Mean`/`Median` fill numeric columns with the statistic of their
    ///   parseable values, written with `fill_precision` decimals. Text
    ///   columns always get the mode.
    /// - `Mode` fills every column with its most frequent non-missing value.
    ///
    /// A column with nothing to compute a fill from is left as is.
    pub fn resolve_missing(
        table: &Table,
        method: MissingStrategy,
        config: &AnalysisConfig,
    ) -> Resolution {
        let missing = find_missing(table);
        if missing.is_empty() {
            debug!("No missing values to resolve");
            return Resolution::unchanged(table);
        }

        if method == MissingStrategy::Delete {
            let rows: BTreeSet<usize> = missing.iter().map(|m| m.row).collect();
            let result = table.without_rows(&rows);
            info!("Removed {} rows containing missing values", rows.len());
            return Resolution {
                table: result,
                changed: ChangedCells::new(),
                rows_removed: rows.len(),
            };
        }

        let mut result = table.clone();
        let mut changed = ChangedCells::new();

        for (idx, column) in table.columns().iter().enumerate() {
            let rows: Vec<usize> = missing
                .iter()
                .filter(|m| &m.column == column)
                .map(|m| m.row)
                .collect();
            if rows.is_empty() {
                continue;
            }

            let column_type = infer_column_type(table, column, config);
            let Some(fill) = Self::fill_value(table, idx, column_type, method, config) else {
                warn!(
                    "Column '{}' has no non-missing values to fill from; left unchanged",
                    column
                );
                continue;
            };

            debug!(
                "Filling {} cells in '{}' ({}) with '{}'",
                rows.len(),
                column,
                column_type,
                fill
            );
            for row in rows {
                result.set_cell(row, idx, fill.clone());
                changed.mark(row, column.clone());
            }
        }

        info!("Filled {} missing cells using {}", changed.len(), method);
        Resolution {
            table: result,
            changed,
            rows_removed: 0,
        }
    }

    /// The value written into a column's missing cells.
    ///
    /// `None` means the column has nothing to derive a fill from.
    pub fn fill_value(
        table: &Table,
        idx: usize,
        column_type: ColumnType,
        method: MissingStrategy,
        config: &AnalysisConfig,
    ) -> Option<CellValue> {
        match (column_type, method) {
            (ColumnType::Numeric, MissingStrategy::Mean | MissingStrategy::Median) => {
                let mut values: Vec<f64> = table
                    .numeric_values(idx)
                    .into_iter()
                    .map(|(_, v)| v)
                    .collect();
                if values.is_empty() {
                    return Some(CellValue::Number(0.0));
                }
                let stat = if method == MissingStrategy::Mean {
                    mean(&values)?
                } else {
                    sort_floats(&mut values);
                    median_sorted(&values)?
                };
                let precision = config.fill_precision;
                Some(CellValue::Text(format_fixed(
                    round_to(stat, precision),
                    precision,
                )))
            }
            _ => column_mode(table, idx),
        }
    }
}

/// Most frequent non-missing value of a column.
///
/// Values are compared by [`CellValue::key`]; ties go to the value seen
/// first. `None` when every cell is missing.
pub fn column_mode(table: &Table, idx: usize) -> Option<CellValue> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut firsts: Vec<&CellValue> = Vec::new();

    for cell in table.column_values(idx).filter(|c| !c.is_missing()) {
        let next = firsts.len();
        let entry = counts.entry(cell.key()).or_insert((0, next));
        if entry.1 == next {
            firsts.push(cell);
        }
        entry.0 += 1;
    }

    counts
        .into_values()
        .max_by(|(count_a, first_a), (count_b, first_b)| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(_, first)| firsts[first].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::find_missing;
    use crate::table::test_support::*;
    use pretty_assertions::assert_eq;

    fn resolve(t: &Table, method: MissingStrategy) -> Resolution {
        StatisticalImputer::resolve_missing(t, method, &AnalysisConfig::default())
    }

    fn mixed_table() -> Table {
        table(
            &["age", "city"],
            vec![
                vec![10.into(), "Seoul".into()],
                vec![CellValue::Missing, "Busan".into()],
                vec![20.into(), "NA".into()],
                vec![25.into(), "Busan".into()],
                vec!["N/A".into(), "Seoul".into()],
                vec![40.into(), "Busan".into()],
            ],
        )
    }

    #[test]
    fn test_delete_removes_rows_with_missing() {
        let res = resolve(&mixed_table(), MissingStrategy::Delete);
        assert_eq!(res.rows_removed, 3);
        assert_eq!(res.table.row_count(), 3);
        assert!(find_missing(&res.table).is_empty());
        assert_eq!(column_strings(&res.table, "age"), vec!["10", "25", "40"]);
        assert!(res.changed.is_empty());
    }

    #[test]
    fn test_mean_fill_numeric_and_mode_for_text() {
        let res = resolve(&mixed_table(), MissingStrategy::Mean);
        // mean of 10, 20, 25, 40 = 23.75
        assert_eq!(
            column_strings(&res.table, "age"),
            vec!["10", "23.75", "20", "25", "23.75", "40"]
        );
        // text column always gets the mode
        assert_eq!(res.table.cell(2, "city"), Some(&CellValue::from("Busan")));
        assert_eq!(res.changed.len(), 3);
        assert!(res.changed.contains(1, "age"));
        assert!(res.changed.contains(2, "city"));
    }

    #[test]
    fn test_mean_is_rounded_to_two_decimals() {
        let t = table(
            &["v"],
            vec![
                vec![1.into()],
                vec![1.into()],
                vec![2.into()],
                vec![2.into()],
                vec![2.into()],
                vec![CellValue::Missing],
            ],
        );
        let res = resolve(&t, MissingStrategy::Mean);
        assert_eq!(res.table.cell(5, "v"), Some(&CellValue::from("1.60")));

        let t = table(
            &["v"],
            vec![vec![1.into()], vec![1.into()], vec![2.into()], vec!["".into()]],
        );
        let res = resolve(&t, MissingStrategy::Mean);
        assert_eq!(res.table.cell(3, "v"), Some(&CellValue::from("1.33")));
    }

    #[test]
    fn test_median_fill() {
        let res = resolve(&mixed_table(), MissingStrategy::Median);
        // median of 10, 20, 25, 40 = 22.5
        assert_eq!(res.table.cell(1, "age"), Some(&CellValue::from("22.50")));
    }

    #[test]
    fn test_mode_fill_numeric() {
        let t = table(
            &["v"],
            vec![
                vec![3.into()],
                vec![7.into()],
                vec![7.into()],
                vec![CellValue::Missing],
            ],
        );
        let res = resolve(&t, MissingStrategy::Mode);
        assert_eq!(res.table.cell(3, "v"), Some(&CellValue::Number(7.0)));
    }

    #[test]
    fn test_mode_tie_goes_to_first_seen() {
        let t = table(
            &["c"],
            vec![
                vec!["b".into()],
                vec!["a".into()],
                vec!["a".into()],
                vec!["b".into()],
            ],
        );
        assert_eq!(column_mode(&t, 0), Some(CellValue::from("b")));
    }

    #[test]
    fn test_all_missing_text_column_left_unchanged() {
        let t = table(
            &["a", "b"],
            vec![
                vec![1.into(), CellValue::Missing],
                vec![CellValue::Missing, "NA".into()],
                vec![3.into(), "".into()],
            ],
        );
        let res = resolve(&t, MissingStrategy::Mean);
        assert_eq!(res.table.cell(1, "a"), Some(&CellValue::from("2.00")));
        assert_eq!(res.table.cell(1, "b"), Some(&CellValue::from("NA")));
        assert!(!res.changed.contains(0, "b"));
    }

    #[test]
    fn test_no_missing_returns_same_table() {
        let t = numeric_column("v", &[1.0, 2.0]);
        let res = resolve(&t, MissingStrategy::Delete);
        assert_eq!(res.table, t);
        assert_eq!(res.rows_removed, 0);
    }
}
