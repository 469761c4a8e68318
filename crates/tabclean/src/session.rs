//! Cleaning session.
//!
//! A [`CleaningSession`] owns the table as it was ingested, a working copy
//! that remediations rewrite, the latest [`QualityReport`] for the working
//! copy, and the cells touched by recent remediations. Every mutation
//! re-runs the analysis, so the report never describes a table that no
//! longer exists.

use crate::config::{AnalysisConfig, MissingStrategy, OutlierStrategy};
use crate::error::Result;
use crate::imputers::{OutlierHandler, StatisticalImputer};
use crate::quality::{DataQualityAnalyzer, QualityReport};
use crate::table::{CellValue, ChangedCells, Table};
use serde::Serialize;
use tracing::info;

// =============================================================================
// Outcome and comparison types
// =============================================================================

/// What a single remediation did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningOutcome {
    pub score_before: u8,
    pub score_after: u8,
    pub rows_removed: usize,
    pub cells_changed: usize,
}

/// Before/after view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison<'a> {
    pub original: &'a Table,
    pub current: &'a Table,
    pub changed: &'a ChangedCells,
}

impl Comparison<'_> {
    /// Whether the current cell at `(row, column)` should be shown as changed:
    /// it was touched by a remediation, or it differs from the original cell
    /// at the same position.
    pub fn is_changed(&self, row: usize, column: &str) -> bool {
        if self.changed.contains(row, column) {
            return true;
        }
        let before = self.original.cell(row, column).unwrap_or(&CellValue::Missing);
        match self.current.cell(row, column) {
            Some(after) => after != before,
            None => false,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone)]
pub struct CleaningSession {
    original: Table,
    current: Table,
    report: QualityReport,
    changed: ChangedCells,
    config: AnalysisConfig,
}

impl CleaningSession {
    /// Start a session with the default configuration.
    pub fn new(table: Table) -> Self {
        Self::with_config(table, AnalysisConfig::default())
    }

    pub fn with_config(table: Table, config: AnalysisConfig) -> Self {
        let report = DataQualityAnalyzer::analyze(&table, &config);
        Self {
            current: table.clone(),
            original: table,
            report,
            changed: ChangedCells::new(),
            config,
        }
    }

    pub fn original(&self) -> &Table {
        &self.original
    }

    pub fn current(&self) -> &Table {
        &self.current
    }

    /// Analysis of the current table.
    pub fn report(&self) -> &QualityReport {
        &self.report
    }

    pub fn changed(&self) -> &ChangedCells {
        &self.changed
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Resolve every missing cell of the current table.
    ///
    /// The changed-cell set is replaced by the cells this fill touched
    /// (and cleared by a row deletion).
    pub fn apply_missing(&mut self, method: MissingStrategy) -> CleaningOutcome {
        let score_before = self.report.score;
        let resolution = StatisticalImputer::resolve_missing(&self.current, method, &self.config);
        let cells_changed = resolution.changed.len();

        self.changed = resolution.changed;
        self.current = resolution.table;
        self.reanalyze();

        let outcome = CleaningOutcome {
            score_before,
            score_after: self.report.score,
            rows_removed: resolution.rows_removed,
            cells_changed,
        };
        info!(
            "Applied '{}' to missing values: score {} -> {}",
            method, outcome.score_before, outcome.score_after
        );
        outcome
    }

    /// Resolve the outliers found by the latest analysis.
    ///
    /// Capped cells are added to the changed-cell set; a row deletion
    /// clears it since row positions shift. On error the session is left
    /// as it was.
    pub fn apply_outliers(&mut self, method: OutlierStrategy) -> Result<CleaningOutcome> {
        let score_before = self.report.score;
        let resolution = OutlierHandler::resolve_outliers(
            &self.current,
            &self.report.outliers,
            method,
            &self.config,
        )?;
        let cells_changed = resolution.changed.len();

        match method {
            OutlierStrategy::Delete => self.changed.clear(),
            OutlierStrategy::Cap => self.changed.extend(resolution.changed),
        }
        self.current = resolution.table;
        self.reanalyze();

        let outcome = CleaningOutcome {
            score_before,
            score_after: self.report.score,
            rows_removed: resolution.rows_removed,
            cells_changed,
        };
        info!(
            "Applied '{}' to outliers: score {} -> {}",
            method, outcome.score_before, outcome.score_after
        );
        Ok(outcome)
    }

    /// Discard every remediation and start again from the original table.
    pub fn reset(&mut self) {
        self.current = self.original.clone();
        self.changed.clear();
        self.reanalyze();
        info!("Session reset to original data");
    }

    pub fn comparison(&self) -> Comparison<'_> {
        Comparison {
            original: &self.original,
            current: &self.current,
            changed: &self.changed,
        }
    }

    /// The current table as a JSON array of records in column order.
    pub fn export_records(&self) -> Result<String> {
        self.current.to_json_records()
    }

    fn reanalyze(&mut self) {
        self.report = DataQualityAnalyzer::analyze(&self.current, &self.config);
    }
}

static_assertions::assert_impl_all!(CleaningSession: Send, Sync);
