//! Custom error types for the cleaning engine.
//!
//! This module provides the error hierarchy using `thiserror`. Detection and
//! scoring never fail on empty input (they degrade to empty results); the
//! variants here come from mutating operations, the pipeline editor, and the
//! ingestion boundary.
//!
//! Errors are serializable so that a frontend can display them as
//! `{ code, message }` pairs.

use crate::transform::StepId;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning engine.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// An operation that needs at least one row and one column got an empty table.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// An unrecognized remediation or transformation method name.
    #[error("Unknown {kind} method '{name}'")]
    InvalidMethod { kind: &'static str, name: String },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Zero-variance or zero-sample column.
    ///
    /// This is a recovered condition: transformations and fills log it and
    /// return their input unchanged instead of surfacing it.
    #[error("Column '{column}' is degenerate: {reason}")]
    DegenerateColumn { column: String, reason: String },

    /// An outlier reference no longer matches the table it is applied to.
    #[error("Stale outlier reference: {0}")]
    StaleReference(String),

    /// No pipeline step with the given id.
    #[error("Pipeline step {0} not found")]
    StepNotFound(StepId),

    /// Two steps in a recipe share the same id.
    #[error("Duplicate pipeline step id {0}")]
    DuplicateStepId(StepId),

    /// No step id left to allocate after the given one.
    #[error("Pipeline step ids exhausted after {0}")]
    StepIdExhausted(StepId),

    /// A reorder request that is not a permutation of the current steps.
    #[error("Invalid step order: {0}")]
    InvalidStepOrder(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The external parser produced nothing usable (unparseable file, no rows).
    #[error("Failed to ingest data: {0}")]
    Ingestion(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for [`CleaningError::InvalidMethod`].
    pub fn invalid_method(kind: &'static str, name: impl Into<String>) -> Self {
        CleaningError::InvalidMethod {
            kind,
            name: name.into(),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::InvalidMethod { .. } => "INVALID_METHOD",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::DegenerateColumn { .. } => "DEGENERATE_COLUMN",
            Self::StaleReference(_) => "STALE_REFERENCE",
            Self::StepNotFound(_) => "STEP_NOT_FOUND",
            Self::DuplicateStepId(_) => "DUPLICATE_STEP_ID",
            Self::StepIdExhausted(_) => "STEP_ID_EXHAUSTED",
            Self::InvalidStepOrder(_) => "INVALID_STEP_ORDER",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Ingestion(_) => "INGESTION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error comes from the ingestion collaborator rather than
    /// the engine itself.
    pub fn is_ingestion(&self) -> bool {
        match self {
            Self::Ingestion(_) | Self::Io(_) | Self::Polars(_) => true,
            Self::WithContext { source, .. } => source.is_ingestion(),
            _ => false,
        }
    }

    /// Check if this error is recoverable (the table was left untouched and
    /// the caller can retry with different input).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::EmptyDataset
            | Self::InvalidMethod { .. }
            | Self::ColumnNotFound(_)
            | Self::DegenerateColumn { .. }
            | Self::StaleReference(_)
            | Self::StepNotFound(_)
            | Self::StepIdExhausted(_)
            | Self::InvalidStepOrder(_)
            | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(CleaningError::EmptyDataset.error_code(), "EMPTY_DATASET");
        assert_eq!(
            CleaningError::ColumnNotFound("age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            CleaningError::invalid_method("missing", "drop").error_code(),
            "INVALID_METHOD"
        );
    }

    #[test]
    fn test_invalid_method_message() {
        let error = CleaningError::invalid_method("transform", "scale");
        assert_eq!(error.to_string(), "Unknown transform method 'scale'");
    }

    #[test]
    fn test_is_recoverable() {
        assert!(CleaningError::EmptyDataset.is_recoverable());
        assert!(CleaningError::StepNotFound(StepId(3)).is_recoverable());
        assert!(!CleaningError::Ingestion("no rows".to_string()).is_recoverable());
    }

    #[test]
    fn test_is_ingestion() {
        assert!(CleaningError::Ingestion("bad file".to_string()).is_ingestion());
        assert!(!CleaningError::EmptyDataset.is_ingestion());
        let wrapped = CleaningError::Ingestion("x".to_string()).with_context("loading");
        assert!(wrapped.is_ingestion());
    }

    #[test]
    fn test_error_serialization() {
        let error = CleaningError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context() {
        let error = CleaningError::ColumnNotFound("x".to_string()).with_context("During normalize");
        assert!(error.to_string().contains("During normalize"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}
