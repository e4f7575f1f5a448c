//! Configuration for the preparation run.
//!
//! Use [`PrepareConfig::builder()`] for a fluent setup, or deserialize a
//! JSON file; both paths go through [`PrepareConfig::validate`].

use crate::scrubber::{DateFormats, NumericFallback};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration for a [`Preparer`](crate::prepare::Preparer).
///
/// # Example
///
/// ```rust,ignore
/// use sales_prep::config::PrepareConfig;
/// use sales_prep::scrubber::NumericFallback;
///
/// let config = PrepareConfig::builder()
///     .input_dir("data/raw")
///     .numeric_fallback(NumericFallback::Null)
///     .max_invalid_ratio(0.2)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    /// Directory holding the raw `<table>_data.csv` files.
    /// Default: "data/raw"
    pub input_dir: PathBuf,

    /// Directory prepared files and reports are written to.
    /// Default: "data/prepared"
    pub output_dir: PathBuf,

    /// Accepted input date formats and the output format.
    pub date_formats: DateFormats,

    /// Replacement for values that fail numeric parsing.
    /// Default: 0.0
    pub numeric_fallback: NumericFallback,

    /// Largest tolerated share of invalid cells among the cleaned columns
    /// before a table is rejected (0.0 - 1.0).
    /// Default: 0.5
    pub max_invalid_ratio: f64,

    /// Extra `source -> canonical` column aliases, checked before the
    /// built-in ones.
    pub extra_aliases: BTreeMap<String, String>,

    /// Whether to write a JSON report per table.
    /// Default: false
    pub generate_reports: bool,

    /// Whether prepared tables are written to `output_dir`.
    /// When false, results stay in memory only.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("data/prepared"),
            date_formats: DateFormats::default(),
            numeric_fallback: NumericFallback::default(),
            max_invalid_ratio: 0.5,
            extra_aliases: BTreeMap::new(),
            generate_reports: false,
            save_to_disk: true,
        }
    }
}

impl PrepareConfig {
    pub fn builder() -> PrepareConfigBuilder {
        PrepareConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.max_invalid_ratio) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "max_invalid_ratio".to_string(),
                value: self.max_invalid_ratio,
            });
        }

        if let NumericFallback::Value(value) = self.numeric_fallback
            && !value.is_finite()
        {
            return Err(ConfigValidationError::NonFiniteFallback(value));
        }

        if self.date_formats.input_formats.is_empty() {
            return Err(ConfigValidationError::NoDateFormats);
        }

        self.date_formats
            .validate()
            .map_err(|e| ConfigValidationError::InvalidDateFormat(e.to_string()))?;

        if let Some((source, _)) = self
            .extra_aliases
            .iter()
            .find(|(source, target)| source.trim().is_empty() || target.trim().is_empty())
        {
            return Err(ConfigValidationError::InvalidAlias(source.clone()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Numeric fallback must be a finite number, got {0}")]
    NonFiniteFallback(f64),

    #[error("At least one input date format is required")]
    NoDateFormats,

    #[error("Invalid date formats: {0}")]
    InvalidDateFormat(String),

    #[error("Column alias '{0}' has an empty source or target")]
    InvalidAlias(String),
}

/// Builder for [`PrepareConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PrepareConfigBuilder {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    date_formats: Option<DateFormats>,
    numeric_fallback: Option<NumericFallback>,
    max_invalid_ratio: Option<f64>,
    extra_aliases: BTreeMap<String, String>,
    generate_reports: Option<bool>,
    save_to_disk: Option<bool>,
}

impl PrepareConfigBuilder {
    /// Set the directory raw CSV files are read from.
    pub fn input_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(path.into());
        self
    }

    /// Set the directory prepared files and reports are written to.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    pub fn date_formats(mut self, formats: DateFormats) -> Self {
        self.date_formats = Some(formats);
        self
    }

    /// Keep the default input formats but render dates with `format`.
    pub fn output_date_format(mut self, format: impl Into<String>) -> Self {
        let formats = self.date_formats.take().unwrap_or_default();
        self.date_formats = Some(DateFormats {
            output_format: format.into(),
            ..formats
        });
        self
    }

    pub fn numeric_fallback(mut self, fallback: NumericFallback) -> Self {
        self.numeric_fallback = Some(fallback);
        self
    }

    /// Set the invalid-value ratio above which a table is rejected.
    ///
    /// # Arguments
    /// * `ratio` - Value between 0.0 and 1.0 (e.g., 0.1 = 10% of cleaned cells)
    pub fn max_invalid_ratio(mut self, ratio: f64) -> Self {
        self.max_invalid_ratio = Some(ratio);
        self
    }

    /// Map an extra source column name onto a canonical one.
    pub fn alias(mut self, source: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.extra_aliases.insert(source.into(), canonical.into());
        self
    }

    /// Enable or disable report generation.
    pub fn generate_reports(mut self, generate: bool) -> Self {
        self.generate_reports = Some(generate);
        self
    }

    /// Enable or disable writing prepared tables to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PrepareConfig` or an error if validation fails.
    pub fn build(self) -> Result<PrepareConfig, ConfigValidationError> {
        let defaults = PrepareConfig::default();
        let config = PrepareConfig {
            input_dir: self.input_dir.unwrap_or(defaults.input_dir),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            date_formats: self.date_formats.unwrap_or(defaults.date_formats),
            numeric_fallback: self.numeric_fallback.unwrap_or(defaults.numeric_fallback),
            max_invalid_ratio: self.max_invalid_ratio.unwrap_or(defaults.max_invalid_ratio),
            extra_aliases: self.extra_aliases,
            generate_reports: self.generate_reports.unwrap_or(defaults.generate_reports),
            save_to_disk: self.save_to_disk.unwrap_or(defaults.save_to_disk),
        };

        config.validate()?;
        Ok(config)
    }
}
