//! Shared helpers for the scrubber and preparation layers.

use crate::error::{Result, ScrubError};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
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
// String Utilities
// =============================================================================

/// Plain decimal literal: optional sign, digits with optional point, optional exponent.
static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid numeric regex")
});

/// Runs of characters that are not allowed in a snake_case column name.
static NON_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid identifier regex"));

/// Parse a strict numeric literal.
///
/// Currency symbols, thousands separators, `inf` and `nan` are rejected:
///
/// ```rust
/// use sales_prep::utils::parse_numeric_literal;
///
/// assert_eq!(parse_numeric_literal(" 19.99 "), Some(19.99));
/// assert_eq!(parse_numeric_literal("19.99$"), None);
/// assert_eq!(parse_numeric_literal("1,000"), None);
/// ```
pub fn parse_numeric_literal(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if !NUMERIC_LITERAL.is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Collapse internal whitespace runs to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key used to match column names against a rename map.
pub fn lookup_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Convert a raw header into a snake_case identifier.
///
/// `" Sale Amt ($) "` becomes `"sale_amt"`.
pub fn snake_case_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    NON_IDENTIFIER
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

// =============================================================================
// DataFrame Utilities
// =============================================================================

/// Column names of a DataFrame as owned strings, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Look up a column, mapping a miss to [`ScrubError::ColumnNotFound`].
pub fn require_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| ScrubError::ColumnNotFound(name.to_string()))
}

/// Render every value of a column as text, keeping nulls as `None`.
pub fn string_values(series: &Series) -> Result<Vec<Option<String>>> {
    let as_text = if series.dtype() == &DataType::String {
        series.clone()
    } else {
        series.cast(&DataType::String)?
    };
    Ok(as_text
        .str()?
        .into_iter()
        .map(|opt| opt.map(|v| v.to_string()))
        .collect())
}

/// Keep the rows flagged `true` in `keep`.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Replace one column of a cloned frame with a new series of the same name.
pub fn with_replaced(df: &DataFrame, name: &str, series: Series) -> Result<DataFrame> {
    let mut out = df.clone();
    out.replace(name, series)?;
    Ok(out)
}

// =============================================================================
// Tests
// =============================================================================
