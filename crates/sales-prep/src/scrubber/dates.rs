//! Date normalization.
//!
//! Input formats are tried in list order and the first one that parses wins,
//! so the order of [`DEFAULT_INPUT_FORMATS`] is part of the contract: ISO
//! dates first, then US month-first forms, then day-first and long forms.
//! `03/04/2024` is therefore March 4th.

use crate::error::{Result, ScrubError};
use crate::types::{ActionType, ScrubAction};
use crate::utils::{require_series, string_values, with_replaced};
use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Accepted input formats, in the order they are attempted.
pub const DEFAULT_INPUT_FORMATS: [&str; 13] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y%m%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Format every normalized date is rendered in.
pub const DEFAULT_OUTPUT_FORMAT: &str = "%Y-%m-%d";

/// Ordered input formats plus the single output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFormats {
    pub input_formats: Vec<String>,
    pub output_format: String,
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            input_formats: DEFAULT_INPUT_FORMATS.iter().map(|f| f.to_string()).collect(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
        }
    }
}

impl DateFormats {
    /// Default input list with a custom output format.
    pub fn with_output(output_format: impl Into<String>) -> Self {
        Self {
            output_format: output_format.into(),
            ..Self::default()
        }
    }

    /// Reject empty lists, malformed patterns, and output formats that do
    /// not read back the date they wrote.
    pub fn validate(&self) -> Result<()> {
        if self.input_formats.is_empty() {
            return Err(ScrubError::InvalidConfig(
                "At least one input date format is required".to_string(),
            ));
        }
        for fmt in self.input_formats.iter().chain(std::iter::once(&self.output_format)) {
            if fmt.trim().is_empty() || StrftimeItems::new(fmt).any(|i| matches!(i, Item::Error)) {
                return Err(ScrubError::InvalidConfig(format!(
                    "Invalid date format '{}'",
                    fmt
                )));
            }
        }

        let Some(sample) = NaiveDate::from_ymd_opt(2024, 3, 14) else {
            return Err(ScrubError::InvalidConfig("Sample date out of range".to_string()));
        };
        let rendered = self.render(sample)?;
        match NaiveDate::parse_from_str(&rendered, &self.output_format) {
            Ok(parsed) if parsed == sample => Ok(()),
            _ => Err(ScrubError::InvalidConfig(format!(
                "Output format '{}' does not round-trip a full date",
                self.output_format
            ))),
        }
    }

    /// Parse with the first matching input format.
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let value = raw.trim();
        self.input_formats.iter().find_map(|fmt| {
            NaiveDate::parse_from_str(value, fmt).ok().or_else(|| {
                NaiveDateTime::parse_from_str(value, fmt)
                    .ok()
                    .map(|dt| dt.date())
            })
        })
    }

    /// Render a date with the output format.
    pub fn render(&self, date: NaiveDate) -> Result<String> {
        let mut rendered = String::new();
        write!(rendered, "{}", date.format(&self.output_format)).map_err(|_| {
            ScrubError::InvalidConfig(format!("Invalid output format '{}'", self.output_format))
        })?;
        Ok(rendered)
    }
}

/// Reformat every value of `column` with `formats.output_format`.
///
/// Unparseable values become null and are counted; nulls and blanks stay
/// null without being counted.
pub fn normalize_date(
    df: &DataFrame,
    column: &str,
    formats: &DateFormats,
) -> Result<(DataFrame, ScrubAction)> {
    formats.validate()?;
    let series = require_series(df, column)?;

    let mut failures = 0;
    let mut normalized: Vec<Option<String>> = Vec::with_capacity(series.len());
    for opt_val in string_values(series)? {
        match opt_val {
            Some(raw) if raw.trim().is_empty() => normalized.push(None),
            Some(raw) => match formats.parse(&raw) {
                Some(date) => normalized.push(Some(formats.render(date)?)),
                None => {
                    failures += 1;
                    normalized.push(None);
                }
            },
            None => normalized.push(None),
        }
    }

    Ok((
        with_replaced(df, column, Series::new(column.into(), normalized))?,
        ScrubAction::new(
            ActionType::DatesNormalized,
            column,
            failures,
            format!(
                "Rendered '{}' as {}; {} unparseable values set to null",
                column, formats.output_format, failures
            ),
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        string_values(df.column(name).unwrap().as_materialized_series()).unwrap()
    }

    #[test]
    fn test_default_formats_are_valid() {
        assert!(DateFormats::default().validate().is_ok());
    }

    #[test]
    fn test_parse_order_prefers_month_first() {
        let formats = DateFormats::default();
        assert_eq!(formats.parse("03/04/2024"), NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(formats.parse("14.03.2024"), NaiveDate::from_ymd_opt(2024, 3, 14));
        assert_eq!(formats.parse("March 14, 2024"), NaiveDate::from_ymd_opt(2024, 3, 14));
        assert_eq!(formats.parse("20240314"), NaiveDate::from_ymd_opt(2024, 3, 14));
        assert_eq!(
            formats.parse("2024-03-14 08:30:00"),
            NaiveDate::from_ymd_opt(2024, 3, 14)
        );
        assert_eq!(formats.parse("not a date"), None);
    }

    #[test]
    fn test_normalize_date_reformats_and_nulls_failures() {
        let df = df![
            "sale_date" => [Some("03/14/2024"), Some("2024-01-02"), Some("31/31/2024"), None, Some(" ")],
        ]
        .unwrap();

        let (out, action) = normalize_date(&df, "sale_date", &DateFormats::default()).unwrap();

        assert_eq!(
            strings(&out, "sale_date"),
            vec![
                Some("2024-03-14".to_string()),
                Some("2024-01-02".to_string()),
                None,
                None,
                None
            ]
        );
        assert_eq!(action.rows_affected, 1);
    }

    #[test]
    fn test_output_is_parseable_by_output_format() {
        let formats = DateFormats::with_output("%d/%m/%Y");
        let df = df!["join_date" => ["2023-07-01", "12/25/2022", "garbage"]].unwrap();

        let (out, _) = normalize_date(&df, "join_date", &formats).unwrap();

        for value in strings(&out, "join_date").into_iter().flatten() {
            assert!(NaiveDate::parse_from_str(&value, "%d/%m/%Y").is_ok());
        }
    }

    #[test]
    fn test_rejects_empty_format_list() {
        let formats = DateFormats {
            input_formats: vec![],
            output_format: "%Y-%m-%d".to_string(),
        };
        let df = df!["d" => ["2024-01-01"]].unwrap();
        let err = normalize_date(&df, "d", &formats).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_rejects_lossy_output_format() {
        assert!(DateFormats::with_output("%Y").validate().is_err());
        assert!(DateFormats::with_output("%Q").validate().is_err());
    }
}
