//! Per-table preparation sequence.

use crate::config::PrepareConfig;
use crate::error::{Result, ResultExt, ScrubError};
use crate::prepare::io::{read_raw_table, write_table};
use crate::reporting::ReportGenerator;
use crate::schema::TableKind;
use crate::scrubber::{
    RenameMap, cast_integral, coerce_numeric, conform_to_schema, drop_duplicates, drop_missing, fill_missing,
    filter_range, inspect, normalize_date, standardize_column_names, trim_and_normalize_strings,
};
use crate::types::{ConsistencyReport, PreparationSummary, ScrubAction};
use polars::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Share of removed rows above which a warning is attached to the summary.
const HIGH_ROW_LOSS_PERCENT: f64 = 30.0;

/// Outcome of preparing one table.
#[derive(Debug, Clone)]
pub struct PreparedTable {
    pub kind: TableKind,
    /// Cleaned table, columns in canonical order.
    pub df: DataFrame,
    /// Every scrubber step, in execution order.
    pub actions: Vec<ScrubAction>,
    pub summary: PreparationSummary,
    pub before: ConsistencyReport,
    pub after: ConsistencyReport,
    /// Invalid values over cleaned cells at the time of the check.
    pub invalid_ratio: f64,
    pub input_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

/// Runs the fixed cleaning sequence for each [`TableKind`].
///
/// # Example
///
/// ```rust,ignore
/// use sales_prep::{PrepareConfig, Preparer, TableKind};
///
/// let preparer = Preparer::new(PrepareConfig::default())?;
/// let prepared = preparer.prepare_file(TableKind::Sales)?;
/// println!("{} rows kept", prepared.summary.rows_after);
/// ```
#[derive(Debug, Clone)]
pub struct Preparer {
    config: PrepareConfig,
}

impl Preparer {
    /// Create a preparer after validating `config`.
    pub fn new(config: PrepareConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ScrubError::InvalidConfig(e.to_string()))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PrepareConfig {
        &self.config
    }

    /// Configured aliases first, then the table's built-in ones.
    pub fn rename_map(&self, kind: TableKind) -> RenameMap {
        let defaults = kind.default_rename_map();
        self.config
            .extra_aliases
            .iter()
            .fold(RenameMap::new(), |map, (source, target)| {
                map.with(source.as_str(), target.as_str())
            })
            .extend_with(defaults)
    }

    /// Raw CSV location for `kind`.
    pub fn input_path(&self, kind: TableKind) -> PathBuf {
        self.config.input_dir.join(kind.raw_file_name())
    }

    /// Prepared CSV location for `kind`.
    pub fn output_path(&self, kind: TableKind) -> PathBuf {
        self.config.output_dir.join(kind.prepared_file_name())
    }

    /// Human-readable list of the steps [`Preparer::prepare`] runs for `kind`.
    pub fn planned_steps(&self, kind: TableKind) -> Vec<String> {
        let mut steps = vec![
            format!("Rename columns to the {} schema", kind),
            "Trim and collapse whitespace in text values".to_string(),
        ];
        for col in kind.numeric_columns() {
            steps.push(format!("Coerce '{}' to a number", col));
        }
        for col in kind.date_columns() {
            steps.push(format!(
                "Normalize '{}' to {}",
                col, self.config.date_formats.output_format
            ));
        }
        for (col, value) in kind.fill_defaults() {
            steps.push(format!("Fill missing '{}' with {}", col, value));
        }
        for (col, _) in kind.range_rules() {
            steps.push(format!("Drop rows with out-of-range '{}'", col));
        }
        steps.push(format!("Drop duplicate '{}' rows", kind.key_column()));
        steps.push(format!(
            "Drop rows missing any of [{}]",
            kind.required_columns().join(", ")
        ));
        steps.push(format!(
            "Cast [{}] to integers",
            kind.integer_columns().join(", ")
        ));
        steps.push("Project onto the canonical column order".to_string());
        steps
    }

    /// Clean `df` as a `kind` table.
    ///
    /// Fails with [`ScrubError::Schema`] when a canonical column cannot be
    /// found and with [`ScrubError::QualityThreshold`] when too many values
    /// had to be replaced.
    pub fn prepare(&self, kind: TableKind, df: &DataFrame) -> Result<PreparedTable> {
        self.prepare_internal(kind, df)
            .context(format!("Preparing table '{}'", kind))
    }

    /// Read `<input_dir>/<kind>_data.csv`, prepare it, and write the result.
    ///
    /// The prepared CSV is written only when `save_to_disk` is set and the
    /// JSON report only when `generate_reports` is set.
    pub fn prepare_file(&self, kind: TableKind) -> Result<PreparedTable> {
        let input_path = self.input_path(kind);
        info!("Reading {}", input_path.display());
        let raw = read_raw_table(&input_path)?;

        let mut prepared = self.prepare(kind, &raw)?;
        prepared.input_path = Some(input_path);

        if self.config.save_to_disk {
            let output_path = self.output_path(kind);
            write_table(&mut prepared.df, &output_path)?;
            info!("Prepared table saved: {}", output_path.display());
            prepared.output_path = Some(output_path);
        }

        if self.config.generate_reports {
            let generator = ReportGenerator::new(self.config.output_dir.clone());
            let report = ReportGenerator::build_report(&prepared);
            prepared.report_path = Some(generator.write_report_to_file(&report)?);
        }

        Ok(prepared)
    }

    /// Consistency snapshot of the raw file for `kind`, without cleaning it.
    pub fn inspect_file(&self, kind: TableKind) -> Result<ConsistencyReport> {
        let raw = read_raw_table(&self.input_path(kind))?;
        inspect(&raw)
    }

    fn prepare_internal(&self, kind: TableKind, df: &DataFrame) -> Result<PreparedTable> {
        let start_time = Instant::now();
        info!(
            "Preparing {} ({} rows, {} columns)",
            kind,
            df.height(),
            df.width()
        );

        let before = inspect(df)?;
        let mut summary = PreparationSummary::new();
        summary.rows_before = df.height();
        summary.columns_before = df.width();
        summary.data_quality_score_before = before.completeness();

        let mut actions = Vec::new();
        let mut record = |action: ScrubAction| {
            debug!("{}", action.description);
            actions.push(action);
        };

        let (mut current, action) =
            standardize_column_names(df, &self.rename_map(kind), kind.columns())?;
        record(action);

        let text_like: Vec<&str> = kind
            .columns()
            .iter()
            .copied()
            .filter(|name| {
                current
                    .column(name)
                    .is_ok_and(|col| col.dtype() == &DataType::String)
            })
            .collect();
        if !text_like.is_empty() {
            let (next, action) = trim_and_normalize_strings(&current, &text_like)?;
            current = next;
            record(action);
        }

        let mut invalid_values = 0;
        for col in kind.numeric_columns() {
            let (next, action) = coerce_numeric(&current, col, self.config.numeric_fallback)?;
            current = next;
            invalid_values += action.rows_affected;
            record(action);
        }
        for col in kind.date_columns() {
            let (next, action) = normalize_date(&current, col, &self.config.date_formats)?;
            current = next;
            invalid_values += action.rows_affected;
            record(action);
        }

        let checked_cells =
            current.height() * (kind.numeric_columns().len() + kind.date_columns().len());
        let invalid_ratio = if checked_cells == 0 {
            0.0
        } else {
            invalid_values as f64 / checked_cells as f64
        };
        if invalid_ratio > self.config.max_invalid_ratio {
            return Err(ScrubError::QualityThreshold {
                table: kind.name().to_string(),
                ratio: invalid_ratio,
                max: self.config.max_invalid_ratio,
            });
        }
        if invalid_values > 0 {
            warn!(
                "{}: {} invalid values replaced ({:.1}% of checked cells)",
                kind,
                invalid_values,
                invalid_ratio * 100.0
            );
            summary.add_warning(format!(
                "{} invalid values were replaced or set to null",
                invalid_values
            ));
        }

        for (col, value) in kind.fill_defaults() {
            let (next, action) = fill_missing(&current, col, &value)?;
            current = next;
            record(action);
        }
        for (col, range) in kind.range_rules() {
            let (next, action) = filter_range(&current, col, range)?;
            current = next;
            record(action);
        }

        let (next, action) = drop_duplicates(&current, &[kind.key_column()])?;
        current = next;
        record(action);

        let (next, action) = drop_missing(&current, kind.required_columns())?;
        current = next;
        record(action);

        for col in kind.integer_columns() {
            let (next, action) = cast_integral(&current, col)?;
            current = next;
            if action.rows_affected == 0 && current.column(col)?.dtype() != &DataType::Int64 {
                warn!("{}: {}", kind, action.description);
                summary.add_warning(action.description.clone());
            }
            record(action);
        }

        let (prepared_df, action) = conform_to_schema(&current, kind.columns())?;
        record(action);

        let after = inspect(&prepared_df)?;
        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        summary.rows_after = prepared_df.height();
        summary.rows_removed = summary.rows_before.saturating_sub(summary.rows_after);
        summary.columns_after = prepared_df.width();
        summary.invalid_values = invalid_values;
        summary.data_quality_score_after = after.completeness();

        if summary.rows_removed_percentage() > HIGH_ROW_LOSS_PERCENT {
            warn!(
                "{}: {:.1}% of rows were removed",
                kind,
                summary.rows_removed_percentage()
            );
            summary.add_warning(format!(
                "High data loss: {:.1}% of rows were removed",
                summary.rows_removed_percentage()
            ));
        }

        info!(
            "Prepared {}: {} -> {} rows in {} ms",
            kind, summary.rows_before, summary.rows_after, summary.duration_ms
        );

        Ok(PreparedTable {
            kind,
            df: prepared_df,
            actions,
            summary,
            before,
            after,
            invalid_ratio,
            input_path: None,
            output_path: None,
            report_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrubber::NumericFallback;
    use crate::types::ActionType;
    use crate::utils::{column_names, string_values};
    use pretty_assertions::assert_eq;

    fn messy_sales() -> DataFrame {
        df![
            "TransactionID" => ["1", "2", "2", "3", "4"],
            "CustomerID" => ["1001", "1002", "1002", "1003", "1004"],
            "ProductID" => ["101", "102", "102", "103", "104"],
            "StoreID" => ["401", "402", "402", "403", "404"],
            "CampaignID" => ["1", "2", "2", "0", "1"],
            "Sale Amt" => ["19.99$", "42.50", "42.50", "10", "oops"],
            "Sale Date" => ["03/14/2024", "2024-01-02", "2024-01-02", "2024-02-02", "June 01, 2024"],
            "BonusPoints" => [Some("10"), None, None, Some("5"), Some(" ")],
            "PaymentType" => [" Credit   Card ", "Cash", "Cash", "Cash", "Debit"],
        ]
        .unwrap()
    }

    fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn ints(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_prepare_sales() {
        let preparer = Preparer::new(PrepareConfig::default()).unwrap();

        let prepared = preparer.prepare(TableKind::Sales, &messy_sales()).unwrap();
        let df = &prepared.df;

        assert_eq!(column_names(df), TableKind::Sales.columns().to_vec());
        assert_eq!(df.height(), 3);
        assert_eq!(ints(df, "sale_id"), vec![Some(1), Some(2), Some(4)]);
        assert_eq!(floats(df, "sale_amount"), vec![Some(0.0), Some(42.5), Some(0.0)]);
        assert_eq!(ints(df, "bonus_points"), vec![Some(10), Some(0), Some(0)]);
        assert_eq!(
            string_values(df.column("sale_date").unwrap().as_materialized_series()).unwrap(),
            vec![
                Some("2024-03-14".to_string()),
                Some("2024-01-02".to_string()),
                Some("2024-06-01".to_string())
            ]
        );
        assert_eq!(
            string_values(df.column("payment_type").unwrap().as_materialized_series())
                .unwrap()[0],
            Some("Credit Card".to_string())
        );
        assert_eq!(prepared.summary.invalid_values, 2);
        assert_eq!(prepared.summary.rows_removed, 2);
        assert_eq!(prepared.summary.warnings.len(), 2);
    }

    #[test]
    fn test_actions_follow_fixed_order() {
        let preparer = Preparer::new(PrepareConfig::default()).unwrap();
        let prepared = preparer.prepare(TableKind::Sales, &messy_sales()).unwrap();

        let kinds: Vec<ActionType> = prepared.actions.iter().map(|a| a.action_type).collect();
        assert_eq!(kinds.first(), Some(&ActionType::ColumnsRenamed));
        assert_eq!(kinds[1], ActionType::StringsTrimmed);
        assert_eq!(kinds.last(), Some(&ActionType::SchemaConformed));
        let dedup = kinds
            .iter()
            .position(|k| *k == ActionType::DuplicatesRemoved)
            .unwrap();
        let range = kinds
            .iter()
            .position(|k| *k == ActionType::RangeFiltered)
            .unwrap();
        assert!(range < dedup);
    }

    #[test]
    fn test_threshold_aborts() {
        let config = PrepareConfig::builder().max_invalid_ratio(0.01).build().unwrap();
        let preparer = Preparer::new(config).unwrap();

        let err = preparer.prepare(TableKind::Sales, &messy_sales()).unwrap_err();

        assert_eq!(err.error_code(), "QUALITY_THRESHOLD");
        assert!(err.to_string().contains("sales"));
    }

    #[test]
    fn test_null_fallback_drops_required_rows() {
        let config = PrepareConfig::builder()
            .numeric_fallback(NumericFallback::Null)
            .build()
            .unwrap();
        let preparer = Preparer::new(config).unwrap();

        let prepared = preparer.prepare(TableKind::Sales, &messy_sales()).unwrap();

        // Both unparseable amounts are now null and fail the required check.
        assert_eq!(floats(&prepared.df, "sale_amount"), vec![Some(42.5)]);
    }

    #[test]
    fn test_fractional_fallback_keeps_decimals() {
        let config = PrepareConfig::builder()
            .numeric_fallback(NumericFallback::Value(0.5))
            .build()
            .unwrap();
        let preparer = Preparer::new(config).unwrap();
        let df = df![
            "StoreID" => ["7", "x"],
            "StoreName" => ["Harbor", "Dock"],
            "City" => ["Maryville", "Denver"],
            "State" => ["MO", "CO"],
            "Country" => ["USA", "USA"],
            "StoreType" => ["Outlet", "Mall"],
        ]
        .unwrap();

        let prepared = preparer.prepare(TableKind::Stores, &df).unwrap();

        assert_eq!(floats(&prepared.df, "store_id"), vec![Some(7.0), Some(0.5)]);
        assert!(
            prepared
                .summary
                .warnings
                .iter()
                .any(|w| w.contains("Kept 'store_id' as decimals"))
        );
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let df = df!["StoreID" => ["1"], "Store Name" => ["North"]].unwrap();
        let preparer = Preparer::new(PrepareConfig::default()).unwrap();

        let err = preparer.prepare(TableKind::Stores, &df).unwrap_err();

        assert!(err.is_schema());
        assert!(err.to_string().contains("Preparing table 'stores'"));
    }

    #[test]
    fn test_extra_alias_wins() {
        let config = PrepareConfig::builder()
            .alias("Ref", "store_id")
            .build()
            .unwrap();
        let preparer = Preparer::new(config).unwrap();
        let df = df![
            "Ref" => ["7"],
            "StoreName" => ["Harbor"],
            "City" => ["Maryville"],
            "State" => ["MO"],
            "Country" => ["USA"],
            "StoreType" => ["Outlet"],
        ]
        .unwrap();

        let prepared = preparer.prepare(TableKind::Stores, &df).unwrap();

        assert_eq!(ints(&prepared.df, "store_id"), vec![Some(7)]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PrepareConfig {
            max_invalid_ratio: -0.1,
            ..PrepareConfig::default()
        };
        assert!(Preparer::new(config).unwrap_err().is_configuration());
    }

    #[test]
    fn test_planned_steps_mention_rules() {
        let preparer = Preparer::new(PrepareConfig::default()).unwrap();
        let steps = preparer.planned_steps(TableKind::Products);
        assert!(steps.iter().any(|s| s.contains("stock_quantity")));
        assert!(steps.iter().any(|s| s.contains("Unknown Product")));
    }
}
