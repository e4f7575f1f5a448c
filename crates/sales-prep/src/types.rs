use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Scrub Actions
// ============================================================================

/// Stats record returned by every scrubbing operation.
///
/// `rows_affected` counts values or rows depending on the operation: values
/// replaced for coercions, rows removed for filters, columns for renames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrubAction {
    /// Type of action performed.
    pub action_type: ActionType,
    /// Target of the action (column name(s) or "table").
    pub target: String,
    /// Number of values, rows or columns touched.
    pub rows_affected: usize,
    /// Human-readable description of the action.
    pub description: String,
}

impl ScrubAction {
    /// Create a new scrub action.
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        rows_affected: usize,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            rows_affected,
            description: description.into(),
        }
    }

    /// Whether the operation reported malformed values it had to replace.
    pub fn is_data_quality_issue(&self) -> bool {
        self.rows_affected > 0 && self.action_type.reports_invalid_values()
    }
}

/// Types of actions the scrubber can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Columns were renamed to their canonical names.
    ColumnsRenamed,
    /// String values were trimmed or whitespace-collapsed.
    StringsTrimmed,
    /// String values had their case changed.
    CaseChanged,
    /// Non-numeric values were replaced by the numeric fallback.
    NumericCoerced,
    /// Dates were reformatted; unparseable ones became null.
    DatesNormalized,
    /// Whole-number columns were cast to integers.
    IntegersCast,
    /// Missing values were filled with a constant.
    ValuesFilled,
    /// Rows outside an allowed numeric range were removed.
    RangeFiltered,
    /// Duplicate rows were removed.
    DuplicatesRemoved,
    /// Rows with missing required values were removed.
    MissingRemoved,
    /// Columns were dropped.
    ColumnsDropped,
    /// The table was projected onto its canonical schema.
    SchemaConformed,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ColumnsRenamed => "Columns Renamed",
            Self::StringsTrimmed => "Strings Trimmed",
            Self::CaseChanged => "Case Changed",
            Self::NumericCoerced => "Numeric Coerced",
            Self::DatesNormalized => "Dates Normalized",
            Self::IntegersCast => "Integers Cast",
            Self::ValuesFilled => "Values Filled",
            Self::RangeFiltered => "Range Filtered",
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::MissingRemoved => "Missing Removed",
            Self::ColumnsDropped => "Columns Dropped",
            Self::SchemaConformed => "Schema Conformed",
        }
    }

    /// Actions whose count means "malformed values replaced".
    pub fn reports_invalid_values(&self) -> bool {
        matches!(self, Self::NumericCoerced | Self::DatesNormalized)
    }
}

// ============================================================================
// Consistency Report
// ============================================================================

/// Snapshot of a table's shape and completeness, taken before or after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub rows: usize,
    pub columns: usize,
    /// Null count per column, keyed by column name.
    pub null_counts: BTreeMap<String, usize>,
    /// Rows identical to an earlier row across every column.
    pub duplicate_rows: usize,
}

impl ConsistencyReport {
    /// Total nulls across all columns.
    pub fn total_nulls(&self) -> usize {
        self.null_counts.values().sum()
    }

    /// Fraction of non-null cells (1.0 for an empty table).
    pub fn completeness(&self) -> f64 {
        let cells = self.rows * self.columns;
        if cells == 0 {
            1.0
        } else {
            1.0 - self.total_nulls() as f64 / cells as f64
        }
    }
}

// ============================================================================
// Preparation Summary
// ============================================================================

/// What a preparation run did to one table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreparationSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,

    pub columns_before: usize,
    pub columns_after: usize,

    /// Values replaced by the numeric fallback or nulled as bad dates.
    pub invalid_values: usize,

    /// Fraction of non-null cells before and after (0.0 - 1.0).
    pub data_quality_score_before: f64,
    pub data_quality_score_after: f64,

    /// Warnings and notes generated during preparation.
    pub warnings: Vec<String>,
}

impl PreparationSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Calculate the percentage of rows removed.
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed as f64 / self.rows_before as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_action_quality_issue() {
        let coerced = ScrubAction::new(ActionType::NumericCoerced, "sale_amount", 3, "Replaced 3");
        assert!(coerced.is_data_quality_issue());

        let clean = ScrubAction::new(ActionType::NumericCoerced, "sale_amount", 0, "Replaced 0");
        assert!(!clean.is_data_quality_issue());

        let dedup = ScrubAction::new(ActionType::DuplicatesRemoved, "sale_id", 5, "Removed 5");
        assert!(!dedup.is_data_quality_issue());
    }

    #[test]
    fn test_action_type_display_name() {
        assert_eq!(ActionType::ColumnsRenamed.display_name(), "Columns Renamed");
        assert_eq!(ActionType::DatesNormalized.display_name(), "Dates Normalized");
    }

    #[test]
    fn test_action_type_serializes_snake_case() {
        let json = serde_json::to_string(&ActionType::DuplicatesRemoved).unwrap();
        assert_eq!(json, "\"duplicates_removed\"");
    }

    #[test]
    fn test_consistency_report_completeness() {
        let report = ConsistencyReport {
            rows: 4,
            columns: 2,
            null_counts: BTreeMap::from([("a".to_string(), 1), ("b".to_string(), 1)]),
            duplicate_rows: 0,
        };
        assert_eq!(report.total_nulls(), 2);
        assert!((report.completeness() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report_is_complete() {
        let report = ConsistencyReport {
            rows: 0,
            columns: 3,
            null_counts: BTreeMap::new(),
            duplicate_rows: 0,
        };
        assert_eq!(report.completeness(), 1.0);
    }

    #[test]
    fn test_rows_removed_percentage() {
        let mut summary = PreparationSummary::new();
        summary.rows_before = 200;
        summary.rows_removed = 50;
        assert!((summary.rows_removed_percentage() - 25.0).abs() < 0.01);
        summary.add_warning("3 invalid dates");
        assert_eq!(summary.warnings.len(), 1);
    }
}
