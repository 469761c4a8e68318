//! Tabular Data-Quality and Transformation Engine
//!
//! A small engine for inspecting and cleaning in-memory tables, built with
//! Rust and Polars.
//!
//! # Overview
//!
//! This library provides:
//!
//! - **Type Inference**: numeric/text classification from non-missing values
//! - **Missing-Value Detection**: structural absence, empty strings, and the
//!   sentinels `NA`, `N/A`, `null`, `NaN`
//! - **Outlier Detection**: IQR fences from nearest-rank quartiles
//! - **Quality Scoring**: a 0-100 completeness score with an outlier penalty
//! - **Remediation**: delete/mean/median/mode for missing values, delete/cap
//!   for outliers
//! - **Transformation Pipeline**: normalize, standardize, and one-hot steps,
//!   always recomputed from the original table
//!
//! The engine never reads files. Callers hand it a [`Table`] (built from
//! JSON records or a Polars `DataFrame`) and get tables and diagnostics
//! back.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabclean::{CleaningSession, MissingStrategy, OutlierStrategy, Table};
//!
//! let table = Table::from_json_records(r#"[{"a": 1}, {"a": "NA"}, {"a": 3}]"#)?;
//! let mut session = CleaningSession::new(table);
//! println!("score: {}", session.report().score);
//!
//! session.apply_missing(MissingStrategy::Median);
//! session.apply_outliers(OutlierStrategy::Cap)?;
//! println!("{}", session.export_records()?);
//! ```
//!
//! # Transformations
//!
//! ```rust,ignore
//! use tabclean::{TransformKind, TransformPipeline};
//!
//! let mut pipeline = TransformPipeline::new();
//! let norm = pipeline.add_step(TransformKind::Normalize, "age")?;
//! let onehot = pipeline.add_step(TransformKind::OneHot, "city")?;
//! pipeline.reorder(&[onehot, norm])?;
//!
//! let transformed = pipeline.run(&original);
//! ```

pub mod config;
pub mod error;
pub mod imputers;
pub mod profiler;
pub mod quality;
pub mod session;
pub mod state;
pub mod table;
pub mod transform;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, MissingStrategy,
    OutlierStrategy,
};
pub use error::{CleaningError, Result, ResultExt};
pub use imputers::{OutlierHandler, Resolution, StatisticalImputer};
pub use profiler::{ColumnProfile, ColumnType, DataProfiler};
pub use quality::{
    DataQualityAnalyzer, DatasetSummary, MissingRef, OutlierBounds, OutlierRef, QualityReport,
};
pub use session::{CleaningOutcome, CleaningSession, Comparison};
pub use state::SharedSession;
pub use table::{CellRef, CellValue, ChangedCells, Table};
pub use transform::{PipelineStep, StepId, TransformKind, TransformPipeline, run_pipeline};
