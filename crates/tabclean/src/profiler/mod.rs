//! Data profiling module for dataset analysis.
//!
//! This module provides functionality for profiling tables, including:
//! - Type inference for columns
//! - Per-column missing counts, cardinality, and numeric statistics

mod statistics;
mod type_inference;

use crate::config::AnalysisConfig;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use statistics::NumericStats;
pub use type_inference::{ColumnType, infer_column_type, infer_column_types};

/// Number of sample values kept per column profile.
const MAX_SAMPLE_VALUES: usize = 5;

/// Profile of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub inferred_type: ColumnType,
    pub missing_count: usize,
    pub missing_percentage: f64,
    pub unique_count: usize,
    pub sample_values: Vec<String>,
    /// Present when at least one value parses as a number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStats>,
}

/// Data profiler for per-column summaries.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of a table, in column order.
    ///
    /// An empty table yields one profile per column with zero counts, or
    /// nothing at all when there are no columns.
    pub fn profile_columns(table: &Table, config: &AnalysisConfig) -> Vec<ColumnProfile> {
        table
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| Self::profile_column(table, idx, name, config))
            .collect()
    }

    fn profile_column(
        table: &Table,
        idx: usize,
        name: &str,
        config: &AnalysisConfig,
    ) -> ColumnProfile {
        let missing_count = table.column_values(idx).filter(|c| c.is_missing()).count();
        let missing_percentage = if table.row_count() > 0 {
            missing_count as f64 / table.row_count() as f64 * 100.0
        } else {
            0.0
        };
        let inferred_type = infer_column_type(table, name, config);

        debug!(
            "Profiled column '{}': {} ({} missing)",
            name, inferred_type, missing_count
        );

        ColumnProfile {
            name: name.to_string(),
            inferred_type,
            missing_count,
            missing_percentage,
            unique_count: statistics::distinct_count(table, idx),
            sample_values: statistics::collect_sample_values(table, idx, MAX_SAMPLE_VALUES),
            numeric: inferred_type
                .is_numeric()
                .then(|| statistics::numeric_stats(table, idx))
                .flatten(),
        }
    }
}
