//! Column-level operations: renaming, dropping and schema projection.

use crate::error::{Result, ScrubError};
use crate::types::{ActionType, ScrubAction};
use crate::utils::{column_names, lookup_key, require_series, snake_case_name};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mapping from messy source column names to canonical names.
///
/// Lookups trim and lowercase both sides, so `" Sale Amt "` and `"SALE AMT"`
/// hit the same entry. The first matching entry wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenameMap {
    entries: Vec<(String, String)>,
}

impl RenameMap {
    /// Create an empty rename map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(source, canonical)` pairs.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(source, target)| (source.into(), target.into()))
                .collect(),
        }
    }

    /// Add a mapping.
    pub fn with(mut self, source: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.entries.push((source.into(), canonical.into()));
        self
    }

    /// Append another map's entries; existing entries keep priority.
    pub fn extend_with(mut self, other: RenameMap) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Canonical name for a source column, if mapped.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        let key = lookup_key(name);
        self.entries
            .iter()
            .find(|(source, _)| lookup_key(source) == key)
            .map(|(_, target)| target.as_str())
    }

    /// Distinct canonical names this map can produce.
    pub fn canonical_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|(_, target)| target.as_str())
            .filter(|target| seen.insert(*target))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rename mapped columns to their canonical names.
///
/// Unmapped columns pass through unchanged. Fails with
/// [`ScrubError::DuplicateColumn`] if two columns collapse onto one name and
/// with [`ScrubError::Schema`] if any `required` column is still absent.
pub fn standardize_column_names<S: AsRef<str>>(
    df: &DataFrame,
    rename_map: &RenameMap,
    required: &[S],
) -> Result<(DataFrame, ScrubAction)> {
    let original = column_names(df);
    let mut renamed = Vec::with_capacity(original.len());
    let mut changes = Vec::new();

    for name in &original {
        match rename_map.lookup(name) {
            Some(target) if target != name => {
                changes.push(format!("{} -> {}", name, target));
                renamed.push(target.to_string());
            }
            _ => renamed.push(name.clone()),
        }
    }

    let present = ensure_unique(&renamed)?;
    let missing: Vec<String> = required
        .iter()
        .map(|r| r.as_ref())
        .filter(|r| !present.contains(r))
        .map(|r| r.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ScrubError::Schema { missing });
    }

    let mut out = df.clone();
    out.set_column_names(renamed.iter().map(|s| s.as_str()))?;

    let description = if changes.is_empty() {
        "No columns needed renaming".to_string()
    } else {
        format!("Renamed {} columns: {}", changes.len(), changes.join(", "))
    };
    Ok((
        out,
        ScrubAction::new(ActionType::ColumnsRenamed, "table", changes.len(), description),
    ))
}

/// Rewrite every column name as snake_case.
///
/// Names that reduce to nothing become `column_<position>`.
pub fn normalize_column_names(df: &DataFrame) -> Result<(DataFrame, ScrubAction)> {
    let original = column_names(df);
    let normalized: Vec<String> = original
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let snake = snake_case_name(name);
            if snake.is_empty() {
                format!("column_{}", idx)
            } else {
                snake
            }
        })
        .collect();

    ensure_unique(&normalized)?;

    let changed = original
        .iter()
        .zip(&normalized)
        .filter(|(before, after)| before != after)
        .count();

    let mut out = df.clone();
    out.set_column_names(normalized.iter().map(|s| s.as_str()))?;

    Ok((
        out,
        ScrubAction::new(
            ActionType::ColumnsRenamed,
            "table",
            changed,
            format!("Normalized {} column names to snake_case", changed),
        ),
    ))
}

/// Remove the named columns. Naming a column twice is an error.
pub fn drop_columns<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<(DataFrame, ScrubAction)> {
    reject_repeated(columns)?;
    for name in columns {
        require_series(df, name.as_ref())?;
    }
    let targets: Vec<PlSmallStr> = columns.iter().map(|s| s.as_ref().into()).collect();
    let listed = join_names(columns);
    let out = df.drop_many(targets);

    Ok((
        out,
        ScrubAction::new(
            ActionType::ColumnsDropped,
            listed.clone(),
            columns.len(),
            format!("Dropped columns: {}", listed),
        ),
    ))
}

/// Project the table onto exactly `schema`, in schema order.
///
/// Extra columns are dropped and counted; a missing schema column is a
/// [`ScrubError::Schema`] error. A schema naming a column twice is
/// rejected as [`ScrubError::InvalidConfig`].
pub fn conform_to_schema<S: AsRef<str>>(df: &DataFrame, schema: &[S]) -> Result<(DataFrame, ScrubAction)> {
    reject_repeated(schema)?;
    let present: HashSet<String> = column_names(df).into_iter().collect();
    let missing: Vec<String> = schema
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| !present.contains(*s))
        .map(|s| s.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ScrubError::Schema { missing });
    }

    let wanted: HashSet<&str> = schema.iter().map(|s| s.as_ref()).collect();
    let extras: Vec<&String> = present.iter().filter(|c| !wanted.contains(c.as_str())).collect();

    let selection: Vec<PlSmallStr> = schema.iter().map(|s| s.as_ref().into()).collect();
    let out = df.select(selection)?;

    let description = if extras.is_empty() {
        "Columns already match the schema".to_string()
    } else {
        let mut names: Vec<&str> = extras.iter().map(|s| s.as_str()).collect();
        names.sort_unstable();
        format!("Dropped {} extra columns: {}", names.len(), names.join(", "))
    };
    Ok((
        out,
        ScrubAction::new(ActionType::SchemaConformed, "table", extras.len(), description),
    ))
}

fn ensure_unique(names: &[String]) -> Result<HashSet<&str>> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ScrubError::DuplicateColumn(name.clone()));
        }
    }
    Ok(seen)
}

fn reject_repeated<S: AsRef<str>>(names: &[S]) -> Result<()> {
    let mut seen = HashSet::with_capacity(names.len());
    match names.iter().map(|s| s.as_ref()).find(|name| !seen.insert(*name)) {
        Some(name) => Err(ScrubError::InvalidConfig(format!(
            "Column '{}' is listed more than once",
            name
        ))),
        None => Ok(()),
    }
}

fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sales_map() -> RenameMap {
        RenameMap::new()
            .with("Sale Amt", "sale_amount")
            .with("Sale Date", "sale_date")
            .with("TransactionID", "sale_id")
    }

    #[test]
    fn test_lookup_is_case_and_whitespace_insensitive() {
        let map = sales_map();
        assert_eq!(map.lookup("  sale amt "), Some("sale_amount"));
        assert_eq!(map.lookup("SALE DATE"), Some("sale_date"));
        assert_eq!(map.lookup("sale_amt"), None);
    }

    #[test]
    fn test_canonical_names_are_distinct() {
        let map = sales_map().with("transaction_id", "sale_id");
        assert_eq!(map.canonical_names(), vec!["sale_amount", "sale_date", "sale_id"]);
    }

    #[test]
    fn test_standardize_renames_mapped_columns() {
        let df = df![
            " Sale Amt" => ["19.99$"],
            "Sale Date" => ["03/14/2024"],
            "payment_type" => ["card"],
        ]
        .unwrap();

        let (out, action) =
            standardize_column_names(&df, &sales_map(), &["sale_amount", "sale_date"]).unwrap();

        assert_eq!(column_names(&out), vec!["sale_amount", "sale_date", "payment_type"]);
        assert_eq!(action.rows_affected, 2);
        assert_eq!(action.action_type, ActionType::ColumnsRenamed);
    }

    #[test]
    fn test_standardize_missing_required_is_schema_error() {
        let df = df!["Sale Amt" => ["1.00"]].unwrap();

        let err = standardize_column_names(&df, &sales_map(), &["sale_amount", "sale_id"])
            .unwrap_err();

        match err {
            ScrubError::Schema { missing } => assert_eq!(missing, vec!["sale_id".to_string()]),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_standardize_collision_is_duplicate_error() {
        let df = df![
            "TransactionID" => ["1"],
            "sale_id" => ["1"],
        ]
        .unwrap();

        let err = standardize_column_names::<&str>(&df, &sales_map(), &[]).unwrap_err();
        assert!(matches!(err, ScrubError::DuplicateColumn(name) if name == "sale_id"));
    }

    #[test]
    fn test_standardize_leaves_input_untouched() {
        let df = df!["Sale Amt" => ["1.00"]].unwrap();
        let _ = standardize_column_names::<&str>(&df, &sales_map(), &[]).unwrap();
        assert_eq!(column_names(&df), vec!["Sale Amt"]);
    }

    #[test]
    fn test_normalize_column_names() {
        let df = df![
            "Customer ID" => [1],
            "Loyalty-Points" => [10],
            "$$" => [0],
        ]
        .unwrap();

        let (out, action) = normalize_column_names(&df).unwrap();

        assert_eq!(column_names(&out), vec!["customer_id", "loyalty_points", "column_2"]);
        assert_eq!(action.rows_affected, 3);
    }

    #[test]
    fn test_drop_columns() {
        let df = df!["a" => [1], "b" => [2], "c" => [3]].unwrap();
        let (out, action) = drop_columns(&df, &["a", "c"]).unwrap();
        assert_eq!(column_names(&out), vec!["b"]);
        assert_eq!(action.rows_affected, 2);

        let err = drop_columns(&df, &["zzz"]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_drop_columns_repeated_name() {
        let df = df!["a" => [1], "b" => [2]].unwrap();

        let err = drop_columns(&df, &["a", "a"]).unwrap_err();

        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_conform_to_schema_reorders_and_drops_extras() {
        let df = df![
            "region" => ["East"],
            "junk" => ["x"],
            "customer_id" => ["1"],
        ]
        .unwrap();

        let (out, action) = conform_to_schema(&df, &["customer_id", "region"]).unwrap();

        assert_eq!(column_names(&out), vec!["customer_id", "region"]);
        assert_eq!(action.rows_affected, 1);
        assert!(action.description.contains("junk"));
    }

    #[test]
    fn test_conform_to_schema_missing_column() {
        let df = df!["customer_id" => ["1"]].unwrap();
        let err = conform_to_schema(&df, &["customer_id", "region"]).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_conform_to_schema_repeated_name() {
        let df = df!["customer_id" => ["1"], "region" => ["East"]].unwrap();
        let err = conform_to_schema(&df, &["customer_id", "customer_id"]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
