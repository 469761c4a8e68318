//! Column transformations.
//!
//! Each transformation takes a table and returns a new one; the input is
//! never modified. Degenerate columns (nothing parseable, zero range, zero
//! variance) come back unchanged.

use crate::error::{CleaningError, Result};
use crate::table::{CellValue, Table};
use crate::utils::{mean, population_std};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Kind of column transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    /// Min-max scaling to `[0, 1]`
    #[serde(rename = "normalize")]
    Normalize,
    /// Z-score with population variance
    #[serde(rename = "standardize")]
    Standardize,
    /// One 0/1 column per distinct value
    #[serde(rename = "oneHot")]
    OneHot,
}

impl TransformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normalize => "normalize",
            Self::Standardize => "standardize",
            Self::OneHot => "oneHot",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = CleaningError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "normalize" => Ok(Self::Normalize),
            "standardize" => Ok(Self::Standardize),
            "oneHot" => Ok(Self::OneHot),
            other => Err(CleaningError::invalid_method("transform", other)),
        }
    }
}

/// Apply one transformation to `column`.
pub fn apply_transformation(table: &Table, kind: TransformKind, column: &str) -> Result<Table> {
    match kind {
        TransformKind::Normalize => normalize(table, column),
        TransformKind::Standardize => standardize(table, column),
        TransformKind::OneHot => one_hot_encode(table, column),
    }
}

fn degenerate(table: &Table, column: &str, reason: &str) -> Table {
    let err = CleaningError::DegenerateColumn {
        column: column.to_string(),
        reason: reason.to_string(),
    };
    warn!("{}; returning input unchanged", err);
    table.clone()
}

/// Min-max scale the parseable values of `column` to `[0, 1]`.
///
/// Missing and non-numeric cells pass through.
pub fn normalize(table: &Table, column: &str) -> Result<Table> {
    let idx = table.require_column(column)?;
    let values: Vec<f64> = table.numeric_values(idx).into_iter().map(|(_, v)| v).collect();
    if values.is_empty() {
        return Ok(degenerate(table, column, "no numeric values"));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return Ok(degenerate(table, column, "zero range"));
    }

    debug!("Normalizing '{}' over [{}, {}]", column, min, max);
    Ok(table.map_column(idx, |cell| match cell.as_number() {
        Some(v) => CellValue::Number((v - min) / (max - min)),
        None => cell.clone(),
    }))
}

/// Z-score the parseable values of `column` using the population standard
/// deviation.
///
/// Missing and non-numeric cells pass through.
pub fn standardize(table: &Table, column: &str) -> Result<Table> {
    let idx = table.require_column(column)?;
    let values: Vec<f64> = table.numeric_values(idx).into_iter().map(|(_, v)| v).collect();
    let (Some(avg), Some(std)) = (mean(&values), population_std(&values)) else {
        return Ok(degenerate(table, column, "no numeric values"));
    };
    if std == 0.0 {
        return Ok(degenerate(table, column, "zero variance"));
    }

    debug!("Standardizing '{}' with mean {} and std {}", column, avg, std);
    Ok(table.map_column(idx, |cell| match cell.as_number() {
        Some(v) => CellValue::Number((v - avg) / std),
        None => cell.clone(),
    }))
}

/// Replace `column` with one `column_<value>` indicator column per distinct
/// value, in order of first appearance.
///
/// Distinct values come from the table as given, missing cells included
/// (an absent cell is keyed `null`). The new columns take the original
/// column's position.
pub fn one_hot_encode(table: &Table, column: &str) -> Result<Table> {
    let idx = table.require_column(column)?;

    let keys: Vec<String> = table.column_values(idx).map(CellValue::key).collect();
    let mut seen = HashSet::new();
    let distinct: Vec<&String> = keys.iter().filter(|k| seen.insert(k.as_str())).collect();

    let replacements = distinct
        .iter()
        .map(|value| {
            let indicator = keys
                .iter()
                .map(|k| CellValue::Number(if k == *value { 1.0 } else { 0.0 }))
                .collect();
            (format!("{}_{}", column, value), indicator)
        })
        .collect::<Vec<_>>();

    debug!(
        "One-hot encoding '{}' into {} columns",
        column,
        replacements.len()
    );
    Ok(table.splice_column(idx, replacements))
}
