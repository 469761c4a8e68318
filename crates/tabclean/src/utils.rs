//! Shared utilities for the cleaning engine.
//!
//! This module contains the numeric parsing and formatting helpers used by
//! type inference, outlier detection, imputation, and the transformations, so
//! that every component agrees on what counts as a number.

use polars::prelude::DataType;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a Polars DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Numeric Parsing Utilities
// =============================================================================

/// Try to parse a string as a finite numeric value.
///
/// Surrounding whitespace is ignored. Infinities and `NaN` are rejected.
///
/// # Example
///
/// ```rust,ignore
/// use tabclean::utils::parse_numeric_str;
///
/// assert_eq!(parse_numeric_str(" 42.5 "), Some(42.5));
/// assert_eq!(parse_numeric_str("12abc"), None);
/// ```
pub fn parse_numeric_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Formatting Utilities
// =============================================================================

/// Format a value with a fixed number of decimals (`12.5` -> `"12.50"`).
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Round a value to a number of decimal places.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Round down to a number of decimal places.
///
/// A value already on the decimal grid (up to float noise) is kept, so
/// `floor_to(0.29, 2)` stays `0.29`.
pub fn floor_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    snap_to_integer(value * factor).floor() / factor
}

/// Round up to a number of decimal places. See [`floor_to`].
pub fn ceil_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    snap_to_integer(value * factor).ceil() / factor
}

fn snap_to_integer(scaled: f64) -> f64 {
    let nearest = scaled.round();
    if (scaled - nearest).abs() < 1e-9 {
        nearest
    } else {
        scaled
    }
}

/// Render a number the way it is shown and exported (`3.0` -> `"3"`).
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{}", value)
}

// =============================================================================
// Statistics Utilities
// =============================================================================

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of an ascending-sorted slice (average of the two middle values for
/// even lengths). `None` for an empty slice.
pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    if n % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Nearest-rank quantile of an ascending-sorted slice: the element at index
/// `floor(n * p)`, clamped to the last element. No interpolation.
pub fn nearest_rank(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    Some(sorted[idx])
}

/// Population standard deviation (divides by `n`). `None` for an empty slice.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Sort floats ascending. Callers only pass finite values.
pub fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

// =============================================================================
// Tests
// =============================================================================
