//! IQR-based outlier detection.
//!
//! Quartiles use the nearest-rank method: after sorting the `n` parseable
//! values ascending, Q1 is the element at `floor(n * 0.25)` and Q3 the
//! element at `floor(n * 0.75)`. There is no interpolation. Values strictly
//! outside `[Q1 - k*IQR, Q3 + k*IQR]` are outliers (`k = 1.5` by default).

use crate::config::AnalysisConfig;
use crate::profiler::ColumnType;
use crate::table::Table;
use crate::utils::{nearest_rank, sort_floats};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive fences computed from one detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    /// True when `value` lies strictly outside the fences.
    pub fn is_outside(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }

    /// Clamp `value` to the fence it crossed, if any.
    pub fn cap(&self, value: f64) -> Option<f64> {
        if value < self.lower {
            Some(self.lower)
        } else if value > self.upper {
            Some(self.upper)
        } else {
            None
        }
    }
}

/// A flagged cell plus the bounds active when it was flagged.
///
/// The bounds are a snapshot: once the table changes they are stale and the
/// reference must be recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierRef {
    pub row: usize,
    pub column: String,
    pub value: f64,
    pub bounds: OutlierBounds,
}

/// Compute the IQR fences of a column.
///
/// `None` when the column does not exist or has fewer than
/// `min_outlier_sample` parseable values.
pub fn compute_bounds(table: &Table, column: &str, config: &AnalysisConfig) -> Option<OutlierBounds> {
    let idx = table.column_index(column)?;
    let mut values: Vec<f64> = table
        .numeric_values(idx)
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    bounds_from_values(&mut values, config)
}

fn bounds_from_values(values: &mut [f64], config: &AnalysisConfig) -> Option<OutlierBounds> {
    if values.len() < config.min_outlier_sample {
        return None;
    }
    sort_floats(values);

    let q1 = nearest_rank(values, 0.25)?;
    let q3 = nearest_rank(values, 0.75)?;
    let iqr = q3 - q1;

    Some(OutlierBounds {
        lower: q1 - config.iqr_multiplier * iqr,
        upper: q3 + config.iqr_multiplier * iqr,
    })
}

/// Flag every parseable value of `column` lying strictly outside its IQR
/// fences. Missing and non-numeric cells are never sampled or flagged.
pub fn find_outliers(table: &Table, column: &str, config: &AnalysisConfig) -> Vec<OutlierRef> {
    let Some(idx) = table.column_index(column) else {
        return Vec::new();
    };

    let samples = table.numeric_values(idx);
    let mut values: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
    let Some(bounds) = bounds_from_values(&mut values, config) else {
        debug!(
            "Skipping outlier detection for '{}': {} numeric values",
            column,
            samples.len()
        );
        return Vec::new();
    };

    let outliers: Vec<OutlierRef> = samples
        .into_iter()
        .filter(|(_, v)| bounds.is_outside(*v))
        .map(|(row, value)| OutlierRef {
            row,
            column: column.to_string(),
            value,
            bounds,
        })
        .collect();

    debug!(
        "Column '{}': bounds [{:.2}, {:.2}], {} outliers",
        column,
        bounds.lower,
        bounds.upper,
        outliers.len()
    );
    outliers
}

/// Run [`find_outliers`] over every numeric column, in column order.
pub fn find_all_outliers(
    table: &Table,
    column_types: &[(String, ColumnType)],
    config: &AnalysisConfig,
) -> Vec<OutlierRef> {
    column_types
        .iter()
        .filter(|(_, ty)| ty.is_numeric())
        .flat_map(|(name, _)| find_outliers(table, name, config))
        .collect()
}
