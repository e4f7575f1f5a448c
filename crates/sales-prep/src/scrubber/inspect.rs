//! Consistency snapshots taken before and after cleaning.

use crate::error::Result;
use crate::types::ConsistencyReport;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Summarize shape, per-column nulls and fully duplicated rows.
pub fn inspect(df: &DataFrame) -> Result<ConsistencyReport> {
    let null_counts: BTreeMap<String, usize> = df
        .get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.null_count()))
        .collect();

    let duplicate_rows = if df.width() == 0 {
        0
    } else {
        df.height() - df.unique_stable(None, UniqueKeepStrategy::First, None)?.height()
    };

    Ok(ConsistencyReport {
        rows: df.height(),
        columns: df.width(),
        null_counts,
        duplicate_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_counts_nulls_and_duplicates() {
        let df = df![
            "store_id" => [Some("1"), Some("1"), Some("2"), None],
            "state" => [Some("MO"), Some("MO"), None, None],
        ]
        .unwrap();

        let report = inspect(&df).unwrap();

        assert_eq!(report.rows, 4);
        assert_eq!(report.columns, 2);
        assert_eq!(report.null_counts["store_id"], 1);
        assert_eq!(report.null_counts["state"], 2);
        assert_eq!(report.duplicate_rows, 1);
    }

    #[test]
    fn test_inspect_empty_frame() {
        let report = inspect(&DataFrame::empty()).unwrap();
        assert_eq!(report.rows, 0);
        assert_eq!(report.duplicate_rows, 0);
        assert_eq!(report.completeness(), 1.0);
    }
}
