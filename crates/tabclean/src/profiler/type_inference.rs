//! Type inference logic for column analysis.

use crate::config::AnalysisConfig;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inferred type of a column. Derived from the current values, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Text,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Count `(numeric, non_missing)` cells in a column.
fn count_numeric_values(table: &Table, idx: usize) -> (usize, usize) {
    table
        .column_values(idx)
        .filter(|cell| !cell.is_missing())
        .fold((0, 0), |(numeric, total), cell| {
            let numeric = numeric + usize::from(cell.as_number().is_some());
            (numeric, total + 1)
        })
}

/// Classify one column as numeric or text.
///
/// A column is numeric when strictly more than `numeric_ratio_threshold` of
/// its non-missing values parse as finite numbers. A column with no
/// non-missing values is text: there is nothing to compute a ratio over.
/// Unknown columns are text as well.
pub fn infer_column_type(table: &Table, column: &str, config: &AnalysisConfig) -> ColumnType {
    let Some(idx) = table.column_index(column) else {
        return ColumnType::Text;
    };

    let (numeric, total) = count_numeric_values(table, idx);
    if total == 0 {
        return ColumnType::Text;
    }

    let ratio = numeric as f64 / total as f64;
    if ratio > config.numeric_ratio_threshold {
        ColumnType::Numeric
    } else {
        ColumnType::Text
    }
}

/// Infer every column's type, in column order.
pub fn infer_column_types(table: &Table, config: &AnalysisConfig) -> Vec<(String, ColumnType)> {
    table
        .columns()
        .iter()
        .map(|name| (name.clone(), infer_column_type(table, name, config)))
        .collect()
}
