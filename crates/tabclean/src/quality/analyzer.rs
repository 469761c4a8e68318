//! Full analysis pass: types, missing cells, outliers, and the score.

use crate::config::AnalysisConfig;
use crate::error::{CleaningError, Result};
use crate::profiler::{ColumnType, infer_column_types};
use crate::quality::{MissingRef, OutlierRef, find_all_outliers, find_missing, quality_score};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Dashboard-level figures for one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub total_cells: usize,
    pub numeric_columns: usize,
    pub missing_count: usize,
    /// Missing cells over all cells, in percent.
    pub missing_percentage: f64,
    pub outlier_count: usize,
    /// Outliers over numeric cells only, in percent (0 without numeric columns).
    pub outlier_percentage: f64,
    pub score: u8,
}

/// Result of running type inference, both detectors, and the scorer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub column_types: Vec<(String, ColumnType)>,
    pub missing: Vec<MissingRef>,
    pub outliers: Vec<OutlierRef>,
    pub score: u8,
    pub summary: DatasetSummary,
}

impl QualityReport {
    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.column_types
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, ty)| *ty)
    }

    pub fn missing_in<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a MissingRef> + 'a {
        self.missing.iter().filter(move |m| m.column == column)
    }

    pub fn rows_with_missing(&self) -> BTreeSet<usize> {
        self.missing.iter().map(|m| m.row).collect()
    }

    pub fn rows_with_outliers(&self) -> BTreeSet<usize> {
        self.outliers.iter().map(|o| o.row).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.outliers.is_empty()
    }
}

pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Run a full analysis pass.
    ///
    /// Read-only and infallible: an empty table yields an empty report with
    /// score 0.
    pub fn analyze(table: &Table, config: &AnalysisConfig) -> QualityReport {
        if table.is_empty() {
            return QualityReport {
                column_types: infer_column_types(table, config),
                summary: DatasetSummary {
                    rows: table.row_count(),
                    columns: table.column_count(),
                    ..Default::default()
                },
                ..Default::default()
            };
        }

        let column_types = infer_column_types(table, config);
        let missing = find_missing(table);
        let outliers = find_all_outliers(table, &column_types, config);
        let score = quality_score(table, &missing, &outliers);
        let summary = Self::summarize(table, &column_types, &missing, &outliers, score);

        info!(
            "Analyzed {} rows x {} columns: {} missing, {} outliers, score {}",
            summary.rows, summary.columns, summary.missing_count, summary.outlier_count, score
        );

        QualityReport {
            column_types,
            missing,
            outliers,
            score,
            summary,
        }
    }

    /// Like [`DataQualityAnalyzer::analyze`] but reports an empty table as
    /// [`CleaningError::EmptyDataset`].
    pub fn try_analyze(table: &Table, config: &AnalysisConfig) -> Result<QualityReport> {
        if table.is_empty() {
            return Err(CleaningError::EmptyDataset);
        }
        Ok(Self::analyze(table, config))
    }

    fn summarize(
        table: &Table,
        column_types: &[(String, ColumnType)],
        missing: &[MissingRef],
        outliers: &[OutlierRef],
        score: u8,
    ) -> DatasetSummary {
        let total_cells = table.total_cells();
        let numeric_columns = column_types.iter().filter(|(_, t)| t.is_numeric()).count();
        let numeric_cells = numeric_columns * table.row_count();

        let missing_percentage = if total_cells > 0 {
            missing.len() as f64 / total_cells as f64 * 100.0
        } else {
            0.0
        };
        let outlier_percentage = if numeric_cells > 0 {
            outliers.len() as f64 / numeric_cells as f64 * 100.0
        } else {
            0.0
        };

        DatasetSummary {
            rows: table.row_count(),
            columns: table.column_count(),
            total_cells,
            numeric_columns,
            missing_count: missing.len(),
            missing_percentage,
            outlier_count: outliers.len(),
            outlier_percentage,
            score,
        }
    }
}
