//! Statistical summaries for column profiling.

use crate::table::Table;
use crate::utils::{mean, median_sorted, population_std, sort_floats};
use serde::{Deserialize, Serialize};

/// Summary statistics over a column's parseable numeric values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

/// Compute [`NumericStats`] for a column. `None` when no value parses.
pub(crate) fn numeric_stats(table: &Table, idx: usize) -> Option<NumericStats> {
    let mut values: Vec<f64> = table
        .numeric_values(idx)
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    if values.is_empty() {
        return None;
    }

    let avg = mean(&values)?;
    let std = population_std(&values)?;
    sort_floats(&mut values);

    Some(NumericStats {
        count: values.len(),
        min: values[0],
        max: values[values.len() - 1],
        mean: avg,
        median: median_sorted(&values)?,
        std,
    })
}

/// Number of distinct non-missing values, keyed the same way the mode is.
pub(crate) fn distinct_count(table: &Table, idx: usize) -> usize {
    table
        .column_values(idx)
        .filter(|c| !c.is_missing())
        .map(|c| c.key())
        .collect::<std::collections::HashSet<_>>()
        .len()
}

/// First `max_samples` non-missing values, rendered as strings.
pub(crate) fn collect_sample_values(table: &Table, idx: usize, max_samples: usize) -> Vec<String> {
    table
        .column_values(idx)
        .filter(|c| !c.is_missing())
        .take(max_samples)
        .map(|c| c.to_string())
        .collect()
}
