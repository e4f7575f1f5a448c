//! Text column operations.

use crate::error::{Result, ScrubError};
use crate::types::{ActionType, ScrubAction};
use crate::utils::{collapse_whitespace, require_series};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Target case for [`change_case`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    Lower,
    Upper,
}

/// Trim each value, collapse internal whitespace, and null out blanks.
///
/// The count covers every value that changed, including those nulled.
pub fn trim_and_normalize_strings<S: AsRef<str>>(
    df: &DataFrame,
    columns: &[S],
) -> Result<(DataFrame, ScrubAction)> {
    map_text_columns(df, columns, ActionType::StringsTrimmed, |raw| {
        let cleaned = collapse_whitespace(raw);
        if cleaned.is_empty() { None } else { Some(cleaned) }
    })
}

/// Trim each value and change it to the requested case.
pub fn change_case<S: AsRef<str>>(
    df: &DataFrame,
    columns: &[S],
    case: TextCase,
) -> Result<(DataFrame, ScrubAction)> {
    map_text_columns(df, columns, ActionType::CaseChanged, |raw| {
        let trimmed = raw.trim();
        Some(match case {
            TextCase::Lower => trimmed.to_lowercase(),
            TextCase::Upper => trimmed.to_uppercase(),
        })
    })
}

fn map_text_columns<S, F>(
    df: &DataFrame,
    columns: &[S],
    action_type: ActionType,
    transform: F,
) -> Result<(DataFrame, ScrubAction)>
where
    S: AsRef<str>,
    F: Fn(&str) -> Option<String>,
{
    let mut out = df.clone();
    let mut changed = 0;

    for name in columns.iter().map(|s| s.as_ref()) {
        let series = require_series(df, name)?;
        if series.dtype() != &DataType::String {
            return Err(ScrubError::InvalidConfig(format!(
                "Column '{}' is {:?}, not a text column",
                name,
                series.dtype()
            )));
        }

        let str_series = series.str()?;
        let mut cleaned_values: Vec<Option<String>> = Vec::with_capacity(str_series.len());
        for opt_val in str_series.into_iter() {
            match opt_val {
                Some(val) => {
                    let cleaned = transform(val);
                    if cleaned.as_deref() != Some(val) {
                        changed += 1;
                    }
                    cleaned_values.push(cleaned);
                }
                None => cleaned_values.push(None),
            }
        }

        out.replace(name, Series::new(name.into(), cleaned_values))?;
    }

    let target = columns
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    let description = format!(
        "{}: {} values changed in [{}]",
        action_type.display_name(),
        changed,
        target
    );
    Ok((out, ScrubAction::new(action_type, target, changed, description)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_trim_and_collapse() {
        let df = df![
            "name" => [Some("  Ada   Lovelace "), Some("Grace"), Some("   "), None],
        ]
        .unwrap();

        let (out, action) = trim_and_normalize_strings(&df, &["name"]).unwrap();

        assert_eq!(
            values(&out, "name"),
            vec![
                Some("Ada Lovelace".to_string()),
                Some("Grace".to_string()),
                None,
                None
            ]
        );
        assert_eq!(action.rows_affected, 2);
    }

    #[test]
    fn test_trim_rejects_non_text_column() {
        let df = df!["loyalty_points" => [1, 2]].unwrap();
        let err = trim_and_normalize_strings(&df, &["loyalty_points"]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_trim_unknown_column() {
        let df = df!["name" => ["a"]].unwrap();
        let err = trim_and_normalize_strings(&df, &["region"]).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_change_case() {
        let df = df!["region" => [" East ", "WEST", "north"]].unwrap();

        let (out, action) = change_case(&df, &["region"], TextCase::Lower).unwrap();

        assert_eq!(
            values(&out, "region"),
            vec![
                Some("east".to_string()),
                Some("west".to_string()),
                Some("north".to_string())
            ]
        );
        assert_eq!(action.rows_affected, 2);
        assert_eq!(action.action_type, ActionType::CaseChanged);
    }
}
