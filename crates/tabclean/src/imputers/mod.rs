//! Remediation module for missing values and outliers.
//!
//! This module provides:
//! - Statistical imputation (delete, mean, median, mode)
//! - Outlier treatment (delete, cap)
//!
//! Every resolver is pure: it returns a [`Resolution`] holding a new table
//! and leaves its input untouched.

mod outliers;
mod statistical;

use crate::table::{ChangedCells, Table};

pub use outliers::OutlierHandler;
pub use statistical::{StatisticalImputer, column_mode};

/// Outcome of a remediation.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The remediated table.
    pub table: Table,
    /// Cells rewritten by a fill or cap. Empty after a row deletion.
    pub changed: ChangedCells,
    pub rows_removed: usize,
}

impl Resolution {
    pub(crate) fn unchanged(table: &Table) -> Self {
        Self {
            table: table.clone(),
            changed: ChangedCells::new(),
            rows_removed: 0,
        }
    }
}
