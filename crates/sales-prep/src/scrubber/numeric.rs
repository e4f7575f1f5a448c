//! Numeric coercion and range filtering.

use crate::error::{Result, ScrubError};
use crate::types::{ActionType, ScrubAction};
use crate::utils::{
    filter_rows, is_numeric_dtype, parse_numeric_literal, require_series, string_values,
    with_replaced,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// What an invalid numeric value is replaced with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFallback {
    /// Substitute a constant (the default policy uses 0.0).
    Value(f64),
    /// Leave a null marker for later imputation or removal.
    Null,
}

impl Default for NumericFallback {
    fn default() -> Self {
        NumericFallback::Value(0.0)
    }
}

impl NumericFallback {
    fn value(&self) -> Option<f64> {
        match self {
            NumericFallback::Value(v) => Some(*v),
            NumericFallback::Null => None,
        }
    }
}

/// Parse a column as Float64, replacing invalid values with `fallback`.
///
/// Nulls and blank strings stay null and are not counted. A column that is
/// already numeric is only cast, so applying this twice is a no-op.
/// A `NaN` or infinite fallback is rejected.
pub fn coerce_numeric(
    df: &DataFrame,
    column: &str,
    fallback: NumericFallback,
) -> Result<(DataFrame, ScrubAction)> {
    if let NumericFallback::Value(v) = fallback
        && !v.is_finite()
    {
        return Err(ScrubError::InvalidConfig(format!(
            "Numeric fallback for '{}' must be finite, got {}",
            column, v
        )));
    }
    let series = require_series(df, column)?;

    if is_numeric_dtype(series.dtype()) {
        let cast = series.cast(&DataType::Float64)?;
        return Ok((
            with_replaced(df, column, cast)?,
            ScrubAction::new(
                ActionType::NumericCoerced,
                column,
                0,
                format!("'{}' already numeric", column),
            ),
        ));
    }

    let mut replaced = 0;
    let coerced: Vec<Option<f64>> = string_values(series)?
        .into_iter()
        .map(|opt_val| match opt_val {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => match parse_numeric_literal(&raw) {
                Some(v) => Some(v),
                None => {
                    replaced += 1;
                    fallback.value()
                }
            },
            None => None,
        })
        .collect();

    let description = match fallback {
        NumericFallback::Value(v) => {
            format!("Replaced {} invalid values in '{}' with {}", replaced, column, v)
        }
        NumericFallback::Null => {
            format!("Replaced {} invalid values in '{}' with null", replaced, column)
        }
    };

    Ok((
        with_replaced(df, column, Series::new(column.into(), coerced))?,
        ScrubAction::new(ActionType::NumericCoerced, column, replaced, description),
    ))
}

/// Cast a numeric `column` to Int64 when every value is a whole number.
///
/// A column holding any fractional or non-finite value is returned
/// unchanged with zero rows affected. Text columns must go through
/// [`coerce_numeric`] first.
pub fn cast_integral(df: &DataFrame, column: &str) -> Result<(DataFrame, ScrubAction)> {
    let series = require_series(df, column)?;
    if !is_numeric_dtype(series.dtype()) {
        return Err(ScrubError::InvalidConfig(format!(
            "Column '{}' must be numeric before casting to integers",
            column
        )));
    }

    let values = series.cast(&DataType::Float64)?;
    let whole = values
        .f64()?
        .into_iter()
        .flatten()
        .all(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64);
    if !whole {
        return Ok((
            df.clone(),
            ScrubAction::new(
                ActionType::IntegersCast,
                column,
                0,
                format!("Kept '{}' as decimals: not every value is whole", column),
            ),
        ));
    }

    let cast_count = series.len() - series.null_count();
    Ok((
        with_replaced(df, column, values.cast(&DataType::Int64)?)?,
        ScrubAction::new(
            ActionType::IntegersCast,
            column,
            cast_count,
            format!("Cast {} values in '{}' to integers", cast_count, column),
        ),
    ))
}

/// Allowed interval for [`filter_range`]; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericRange {
    pub lower: Option<f64>,
    pub lower_inclusive: bool,
    pub upper: Option<f64>,
    pub upper_inclusive: bool,
}

impl NumericRange {
    /// `value > bound`
    pub fn greater_than(bound: f64) -> Self {
        Self {
            lower: Some(bound),
            lower_inclusive: false,
            ..Self::default()
        }
    }

    /// `value >= bound`
    pub fn at_least(bound: f64) -> Self {
        Self {
            lower: Some(bound),
            lower_inclusive: true,
            ..Self::default()
        }
    }

    /// `value <= bound`
    pub fn at_most(bound: f64) -> Self {
        Self {
            upper: Some(bound),
            upper_inclusive: true,
            ..Self::default()
        }
    }

    /// `lower <= value <= upper`
    pub fn between(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            lower_inclusive: true,
            upper: Some(upper),
            upper_inclusive: true,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let above = match self.lower {
            Some(lo) if self.lower_inclusive => value >= lo,
            Some(lo) => value > lo,
            None => true,
        };
        let below = match self.upper {
            Some(hi) if self.upper_inclusive => value <= hi,
            Some(hi) => value < hi,
            None => true,
        };
        above && below
    }

    fn describe(&self) -> String {
        let lo = match self.lower {
            Some(v) if self.lower_inclusive => format!("[{}", v),
            Some(v) => format!("({}", v),
            None => "(-inf".to_string(),
        };
        let hi = match self.upper {
            Some(v) if self.upper_inclusive => format!("{}]", v),
            Some(v) => format!("{})", v),
            None => "inf)".to_string(),
        };
        format!("{}, {}", lo, hi)
    }
}

/// Keep only rows whose value in `column` lies inside `range`.
///
/// Nulls and values that do not parse as numbers are removed too.
pub fn filter_range(
    df: &DataFrame,
    column: &str,
    range: NumericRange,
) -> Result<(DataFrame, ScrubAction)> {
    if let (Some(lo), Some(hi)) = (range.lower, range.upper)
        && lo > hi
    {
        return Err(ScrubError::InvalidConfig(format!(
            "Range for '{}' has lower bound {} above upper bound {}",
            column, lo, hi
        )));
    }

    let series = require_series(df, column)?;
    let numbers: Vec<Option<f64>> = if is_numeric_dtype(series.dtype()) {
        series.cast(&DataType::Float64)?.f64()?.into_iter().collect()
    } else {
        string_values(series)?
            .iter()
            .map(|v| v.as_deref().and_then(parse_numeric_literal))
            .collect()
    };

    let keep: Vec<bool> = numbers
        .iter()
        .map(|v| v.is_some_and(|n| range.contains(n)))
        .collect();
    let removed = keep.iter().filter(|k| !**k).count();

    Ok((
        filter_rows(df, &keep)?,
        ScrubAction::new(
            ActionType::RangeFiltered,
            column,
            removed,
            format!(
                "Removed {} rows with '{}' outside {}",
                removed,
                column,
                range.describe()
            ),
        ),
    ))
}
