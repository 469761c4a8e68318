//! Data quality analysis module.
//!
//! This module provides functionality for identifying data quality issues
//! (missing values and IQR outliers) and scoring a table from them.

mod analyzer;
mod missing;
mod outliers;
mod scoring;

pub use analyzer::{DataQualityAnalyzer, DatasetSummary, QualityReport};
pub use missing::{MISSING_SENTINELS, MissingRef, find_missing, is_missing_value};
pub use outliers::{
    OutlierBounds, OutlierRef, compute_bounds, find_all_outliers, find_outliers,
};
pub use scoring::{quality_score, score_from_counts};
