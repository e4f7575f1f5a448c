//! Error types for the scrubbing and preparation layers.
//!
//! Only caller mistakes and schema violations are errors. Malformed values in
//! individual rows never raise; the scrubber resolves them through its
//! default/null policies and reports them as counts.
//!
//! Errors are serializable so they can be embedded in JSON reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for scrubbing and table preparation.
#[derive(Error, Debug)]
pub enum ScrubError {
    /// Required canonical columns are absent after renaming.
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Two columns ended up with the same name.
    #[error("Column '{0}' appears more than once after renaming")]
    DuplicateColumn(String),

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Invalid configuration or API misuse (empty key list, bad format...).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Too many values were invalid for the run to be trusted.
    #[error(
        "Invalid value ratio {ratio:.3} for table '{table}' exceeds the allowed maximum {max:.3}"
    )]
    QualityThreshold { table: String, ratio: f64, max: f64 },

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
        source: Box<ScrubError>,
    },
}

impl ScrubError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ScrubError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for reports and scripts.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "SCHEMA_ERROR",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::QualityThreshold { .. } => "QUALITY_THRESHOLD",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error comes from misusing the API.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::InvalidConfig(_) | Self::ColumnNotFound(_) | Self::DuplicateColumn(_) => true,
            Self::WithContext { source, .. } => source.is_configuration(),
            _ => false,
        }
    }

    /// Check if this error is a schema violation.
    pub fn is_schema(&self) -> bool {
        match self {
            Self::Schema { .. } => true,
            Self::WithContext { source, .. } => source.is_schema(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ScrubError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ScrubError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for scrubbing operations.
pub type Result<T> = std::result::Result<T, ScrubError>;

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
        self.map_err(|e| ScrubError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ScrubError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            ScrubError::InvalidConfig("empty".to_string()).error_code(),
            "INVALID_CONFIG"
        );
        assert_eq!(
            ScrubError::ColumnNotFound("sale_id".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_schema_message_lists_columns() {
        let error = ScrubError::Schema {
            missing: vec!["sale_id".to_string(), "sale_date".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Missing required columns: sale_id, sale_date"
        );
        assert!(error.is_schema());
        assert!(!error.is_configuration());
    }

    #[test]
    fn test_is_configuration() {
        assert!(ScrubError::InvalidConfig("x".to_string()).is_configuration());
        assert!(ScrubError::ColumnNotFound("x".to_string()).is_configuration());
        assert!(ScrubError::DuplicateColumn("x".to_string()).is_configuration());
        assert!(
            !ScrubError::QualityThreshold {
                table: "sales".to_string(),
                ratio: 0.9,
                max: 0.5,
            }
            .is_configuration()
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = ScrubError::ColumnNotFound("region".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("region"));
    }

    #[test]
    fn test_with_context() {
        let error = ScrubError::InvalidConfig("no key columns".to_string())
            .with_context("While preparing sales");
        assert!(error.to_string().contains("While preparing sales"));
        assert_eq!(error.error_code(), "INVALID_CONFIG");
        assert!(error.is_configuration());
    }
}
