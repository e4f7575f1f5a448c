//! Row-level operations: deduplication, missing-value removal and filling.

use crate::error::{Result, ScrubError};
use crate::types::{ActionType, ScrubAction};
use crate::utils::{filter_rows, is_numeric_dtype, require_series, string_values, with_replaced};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Constant used by [`fill_missing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

impl From<f64> for FillValue {
    fn from(value: f64) -> Self {
        FillValue::Number(value)
    }
}

impl From<&str> for FillValue {
    fn from(value: &str) -> Self {
        FillValue::Text(value.to_string())
    }
}

impl std::fmt::Display for FillValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillValue::Number(v) => write!(f, "{}", v),
            FillValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// Remove later rows whose `key_columns` match an earlier surviving row.
///
/// Survivors keep their order and values; nulls compare equal to nulls.
pub fn drop_duplicates<S: AsRef<str>>(
    df: &DataFrame,
    key_columns: &[S],
) -> Result<(DataFrame, ScrubAction)> {
    if key_columns.is_empty() {
        return Err(ScrubError::InvalidConfig(
            "drop_duplicates needs at least one key column".to_string(),
        ));
    }
    let keys: Vec<String> = key_columns.iter().map(|s| s.as_ref().to_string()).collect();
    for key in &keys {
        require_series(df, key)?;
    }
    let out = df.unique_stable(Some(&keys), UniqueKeepStrategy::First, None)?;
    let removed = df.height() - out.height();
    let target = keys.join(", ");

    Ok((
        out,
        ScrubAction::new(
            ActionType::DuplicatesRemoved,
            target.clone(),
            removed,
            format!("Removed {} duplicate rows by [{}]", removed, target),
        ),
    ))
}

/// Remove rows with a null in any of `required_columns`.
pub fn drop_missing<S: AsRef<str>>(
    df: &DataFrame,
    required_columns: &[S],
) -> Result<(DataFrame, ScrubAction)> {
    if required_columns.is_empty() {
        return Err(ScrubError::InvalidConfig(
            "drop_missing needs at least one required column".to_string(),
        ));
    }

    let mut keep = vec![true; df.height()];
    for name in required_columns.iter().map(|s| s.as_ref()) {
        let nulls = require_series(df, name)?.is_null();
        for (idx, is_null) in nulls.into_iter().enumerate() {
            if is_null.unwrap_or(false) {
                keep[idx] = false;
            }
        }
    }
    let removed = keep.iter().filter(|k| !**k).count();
    let target = required_columns
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ");

    Ok((
        filter_rows(df, &keep)?,
        ScrubAction::new(
            ActionType::MissingRemoved,
            target.clone(),
            removed,
            format!("Removed {} rows missing any of [{}]", removed, target),
        ),
    ))
}

/// Replace nulls in `column` with `value`.
///
/// Numbers fill numeric columns directly and are rendered as text in text
/// columns; text cannot fill a numeric column.
pub fn fill_missing(
    df: &DataFrame,
    column: &str,
    value: &FillValue,
) -> Result<(DataFrame, ScrubAction)> {
    if let FillValue::Number(n) = value
        && !n.is_finite()
    {
        return Err(ScrubError::InvalidConfig(format!(
            "Fill value for '{}' must be finite, got {}",
            column, n
        )));
    }
    let series = require_series(df, column)?;
    let filled_count = series.null_count();

    let filled = match value {
        FillValue::Number(n) if is_numeric_dtype(series.dtype()) => {
            let values: Vec<Option<f64>> = series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| Some(v.unwrap_or(*n)))
                .collect();
            Series::new(column.into(), values)
        }
        FillValue::Text(_) if is_numeric_dtype(series.dtype()) => {
            return Err(ScrubError::InvalidConfig(format!(
                "Cannot fill numeric column '{}' with text {}",
                column, value
            )));
        }
        _ => {
            let replacement = match value {
                FillValue::Number(n) => n.to_string(),
                FillValue::Text(s) => s.clone(),
            };
            let values: Vec<Option<String>> = string_values(series)?
                .into_iter()
                .map(|v| Some(v.unwrap_or_else(|| replacement.clone())))
                .collect();
            Series::new(column.into(), values)
        }
    };

    Ok((
        with_replaced(df, column, filled)?,
        ScrubAction::new(
            ActionType::ValuesFilled,
            column,
            filled_count,
            format!("Filled {} missing values in '{}' with {}", filled_count, column, value),
        ),
    ))
}
