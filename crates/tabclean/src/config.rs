//! Configuration types for the cleaning engine.
//!
//! This module provides the remediation strategies and the analysis
//! configuration, built with the builder pattern. The defaults reproduce the
//! classic behavior: an 80% numeric ratio for type inference, Tukey fences at
//! 1.5 IQR, at least four samples for outlier detection, and fills rounded to
//! two decimals.

use crate::error::CleaningError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strategy for resolving missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingStrategy {
    /// Drop every row that contains at least one missing cell
    Delete,
    /// Fill numeric columns with the mean of parseable values
    Mean,
    /// Fill numeric columns with the median of parseable values
    Median,
    /// Fill with the most frequent non-missing value
    Mode,
}

impl MissingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
        }
    }
}

impl fmt::Display for MissingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MissingStrategy {
    type Err = CleaningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(Self::Delete),
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "mode" => Ok(Self::Mode),
            other => Err(CleaningError::invalid_method("missing-value", other)),
        }
    }
}

/// Strategy for resolving detected outliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierStrategy {
    /// Drop every row referenced by an outlier
    Delete,
    /// Replace each outlier with the bound it crossed
    Cap,
}

impl OutlierStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Cap => "cap",
        }
    }
}

impl fmt::Display for OutlierStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OutlierStrategy {
    type Err = CleaningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(Self::Delete),
            "cap" => Ok(Self::Cap),
            other => Err(CleaningError::invalid_method("outlier", other)),
        }
    }
}

/// Largest `fill_precision` accepted; an f64 carries about 15 significant
/// decimal digits.
pub const MAX_FILL_PRECISION: usize = 15;

/// Tunables for detection and imputation.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use tabclean::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .iqr_multiplier(3.0)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Fraction of non-missing values that must parse as numbers for a
    /// column to be classified numeric (strictly greater than).
    /// Default: 0.8
    pub numeric_ratio_threshold: f64,

    /// Multiplier applied to the IQR when computing outlier fences.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Minimum number of numeric samples needed before outliers are detected.
    /// Default: 4
    pub min_outlier_sample: usize,

    /// Decimal places used when writing mean/median fills and capped values,
    /// at most [`MAX_FILL_PRECISION`].
    /// Default: 2
    pub fill_precision: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            numeric_ratio_threshold: 0.8,
            iqr_multiplier: 1.5,
            min_outlier_sample: 4,
            fill_precision: 2,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.numeric_ratio_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "numeric_ratio_threshold".to_string(),
                value: self.numeric_ratio_threshold,
            });
        }

        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidMultiplier(self.iqr_multiplier));
        }

        if self.min_outlier_sample == 0 {
            return Err(ConfigValidationError::InvalidSampleSize(
                self.min_outlier_sample,
            ));
        }

        if self.fill_precision > MAX_FILL_PRECISION {
            return Err(ConfigValidationError::InvalidPrecision(self.fill_precision));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid IQR multiplier: {0} (must be a positive finite number)")]
    InvalidMultiplier(f64),

    #[error("Invalid minimum outlier sample: {0} (must be at least 1)")]
    InvalidSampleSize(usize),

    #[error("Invalid fill precision: {0} (must be at most 15)")]
    InvalidPrecision(usize),
}

impl From<ConfigValidationError> for CleaningError {
    fn from(err: ConfigValidationError) -> Self {
        CleaningError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    numeric_ratio_threshold: Option<f64>,
    iqr_multiplier: Option<f64>,
    min_outlier_sample: Option<usize>,
    fill_precision: Option<usize>,
}

impl AnalysisConfigBuilder {
    /// Set the numeric ratio a column must exceed to be classified numeric.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.8 = 80%)
    pub fn numeric_ratio_threshold(mut self, threshold: f64) -> Self {
        self.numeric_ratio_threshold = Some(threshold);
        self
    }

    /// Set the IQR multiplier for outlier fences.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the minimum sample size for outlier detection.
    pub fn min_outlier_sample(mut self, n: usize) -> Self {
        self.min_outlier_sample = Some(n);
        self
    }

    /// Set the number of decimals written by fills and caps.
    pub fn fill_precision(mut self, decimals: usize) -> Self {
        self.fill_precision = Some(decimals);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            numeric_ratio_threshold: self
                .numeric_ratio_threshold
                .unwrap_or(defaults.numeric_ratio_threshold),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            min_outlier_sample: self
                .min_outlier_sample
                .unwrap_or(defaults.min_outlier_sample),
            fill_precision: self.fill_precision.unwrap_or(defaults.fill_precision),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.numeric_ratio_threshold, 0.8);
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.min_outlier_sample, 4);
        assert_eq!(config.fill_precision, 2);
    }

    #[test]
    fn test_builder_defaults() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .numeric_ratio_threshold(0.5)
            .iqr_multiplier(3.0)
            .min_outlier_sample(10)
            .fill_precision(4)
            .build()
            .unwrap();

        assert_eq!(config.numeric_ratio_threshold, 0.5);
        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(config.min_outlier_sample, 10);
        assert_eq!(config.fill_precision, 4);
    }

    #[test]
    fn test_validation_invalid_threshold() {
        let result = AnalysisConfig::builder().numeric_ratio_threshold(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_validation_invalid_multiplier() {
        let result = AnalysisConfig::builder().iqr_multiplier(-1.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidMultiplier(_)
        ));

        let result = AnalysisConfig::builder().iqr_multiplier(f64::NAN).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_invalid_sample_size() {
        let result = AnalysisConfig::builder().min_outlier_sample(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidSampleSize(0)
        ));
    }

    #[test]
    fn test_validation_invalid_precision() {
        let result = AnalysisConfig::builder().fill_precision(309).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPrecision(309)
        ));

        let config = AnalysisConfig::builder()
            .fill_precision(MAX_FILL_PRECISION)
            .build()
            .unwrap();
        assert_eq!(config.fill_precision, 15);

        let json = r#"{
            "numeric_ratio_threshold": 0.8,
            "iqr_multiplier": 1.5,
            "min_outlier_sample": 4,
            "fill_precision": 400
        }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_error_converts_to_cleaning_error() {
        let err: CleaningError = ConfigValidationError::InvalidSampleSize(0).into();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("mean".parse::<MissingStrategy>().unwrap(), MissingStrategy::Mean);
        assert_eq!("cap".parse::<OutlierStrategy>().unwrap(), OutlierStrategy::Cap);

        let err = "Mean".parse::<MissingStrategy>().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_METHOD");
        assert!("clip".parse::<OutlierStrategy>().is_err());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "numeric_ratio_threshold": 0.9,
            "iqr_multiplier": 2.0,
            "min_outlier_sample": 8,
            "fill_precision": 3
        }"#;

        let config: AnalysisConfig =
            serde_json::from_str(json).expect("Should deserialize from frontend JSON");
        assert_eq!(config.numeric_ratio_threshold, 0.9);
        assert_eq!(config.min_outlier_sample, 8);
    }

    #[test]
    fn test_strategy_serialization() {
        let json = serde_json::to_string(&MissingStrategy::Median).unwrap();
        assert_eq!(json, "\"median\"");
        let parsed: OutlierStrategy = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(parsed, OutlierStrategy::Delete);
    }
}
