//! CLI entry point for sales data preparation.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use sales_prep::{
    DryRunReport, NumericFallback, PrepareConfig, PreparationReport, PreparedTable, Preparer,
    ReportGenerator, TableKind,
};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

/// CLI-compatible table selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliTable {
    Sales,
    Customers,
    Products,
    Stores,
    Campaigns,
    /// Every table, dimensions first
    All,
}

impl CliTable {
    fn kinds(self) -> Vec<TableKind> {
        match self {
            CliTable::Sales => vec![TableKind::Sales],
            CliTable::Customers => vec![TableKind::Customers],
            CliTable::Products => vec![TableKind::Products],
            CliTable::Stores => vec![TableKind::Stores],
            CliTable::Campaigns => vec![TableKind::Campaigns],
            CliTable::All => TableKind::ALL.to_vec(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Sales warehouse data preparation",
    long_about = "Cleans raw sales, customer, product, store and campaign CSV files so they \
                  match the warehouse schema.\n\n\
                  Reads <input-dir>/<table>_data.csv and writes \
                  <output-dir>/<table>_data_prepared.csv.\n\n\
                  EXAMPLES:\n  \
                  # Prepare every table\n  \
                  sales-prep\n\n  \
                  # Only the fact table, with a stricter quality threshold\n  \
                  sales-prep -t sales --max-invalid-ratio 0.05\n\n  \
                  # Preview without writing anything\n  \
                  sales-prep --dry-run"
)]
struct Args {
    /// Table to prepare
    #[arg(short, long, value_enum, default_value = "all")]
    table: CliTable,

    /// Directory holding the raw CSV files [default: data/raw]
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory for prepared files and reports [default: data/prepared]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// JSON file with a full preparation config
    ///
    /// Flags given on the command line override values from the file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output date format (strftime syntax)
    #[arg(long)]
    date_format: Option<String>,

    /// Replacement for values that are not valid numbers
    #[arg(long, conflicts_with = "null_invalid_numbers")]
    numeric_default: Option<f64>,

    /// Set invalid numbers to null instead of a default value
    #[arg(long)]
    null_invalid_numbers: bool,

    /// Largest tolerated share of invalid values (0.0 - 1.0)
    #[arg(long)]
    max_invalid_ratio: Option<f64>,

    /// Show consistency reports and planned steps without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON reports.
    #[arg(long)]
    json: bool,

    /// Write a <table>_report.json per table to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG from .env must be visible to the filter.
    dotenv().ok();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let preparer = Preparer::new(config)?;
    let kinds = args.table.kinds();

    if args.dry_run {
        return run_dry_run(&preparer, &kinds, &args);
    }

    let mut reports = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let prepared = preparer.prepare_file(kind).map_err(|e| {
            error!("Preparation failed: {}", e);
            anyhow!(e)
        })?;
        let report = ReportGenerator::build_report(&prepared);
        if !args.json && !args.quiet {
            print_human_readable_summary(&prepared, &report);
        }
        reports.push(report);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &Args) -> Result<PrepareConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: PrepareConfig = serde_json::from_str(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            config
        }
        None => PrepareConfig::default(),
    };

    if let Some(dir) = &args.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(format) = &args.date_format {
        config.date_formats.output_format = format.clone();
    }
    if args.null_invalid_numbers {
        config.numeric_fallback = NumericFallback::Null;
    } else if let Some(value) = args.numeric_default {
        config.numeric_fallback = NumericFallback::Value(value);
    }
    if let Some(ratio) = args.max_invalid_ratio {
        config.max_invalid_ratio = ratio;
    }
    if args.emit_report {
        config.generate_reports = true;
    }
    if args.dry_run {
        config.save_to_disk = false;
        config.generate_reports = false;
    }

    config.validate()?;
    Ok(config)
}

/// Run dry-run mode - show what would happen without processing
///
/// Uses `println!` on purpose: this output is the point of `--dry-run` and
/// must stay visible regardless of log level.
fn run_dry_run(preparer: &Preparer, kinds: &[TableKind], args: &Args) -> Result<()> {
    let mut reports = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let consistency = preparer
            .inspect_file(kind)
            .with_context(|| format!("Dry run failed for table '{}'", kind))?;
        reports.push(DryRunReport {
            table: kind,
            input_file: preparer.input_path(kind).display().to_string(),
            consistency,
            planned_steps: preparer.planned_steps(kind),
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of preparation steps");
    println!("{}", "=".repeat(80));

    for report in &reports {
        let consistency = &report.consistency;
        println!();
        println!("{}", report.table.name().to_uppercase());
        println!("{}", "-".repeat(40));
        println!("  File: {}", report.input_file);
        println!("  Rows: {}", consistency.rows);
        println!("  Columns: {}", consistency.columns);
        println!("  Duplicate rows: {}", consistency.duplicate_rows);
        println!("  Completeness: {:.1}%", consistency.completeness() * 100.0);
        println!();

        println!("  {:<30} {:>10}", "Column", "Missing");
        for (column, nulls) in &consistency.null_counts {
            println!("  {:<30} {:>10}", truncate_str(column, 29), nulls);
        }
        println!();

        println!("  Planned steps:");
        for (idx, step) in report.planned_steps.iter().enumerate() {
            println!("    {}. {}", idx + 1, step);
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("No files were written. Run without --dry-run to prepare.");
    println!("{}", "=".repeat(80));
    Ok(())
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a human-readable summary of one prepared table.
fn print_human_readable_summary(prepared: &PreparedTable, report: &PreparationReport) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("PREPARED: {}", report.table.name().to_uppercase());
    println!("{}", "=".repeat(80));

    if let Some(ref input_file) = report.input_file {
        println!(
            "Input:  {} ({} rows x {} columns)",
            input_file, summary.rows_before, summary.columns_before
        );
    }
    if let Some(ref output_file) = report.output_file {
        println!(
            "Output: {} ({} rows x {} columns)",
            output_file, summary.rows_after, summary.columns_after
        );
    }
    if let Some(ref report_path) = prepared.report_path {
        println!("Report: {}", report_path.display());
    }
    println!();

    println!("Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed, {:.1}%)",
        summary.rows_before,
        summary.rows_after,
        summary.rows_removed,
        summary.rows_removed_percentage()
    );
    println!(
        "  Data Quality: {:.1}% -> {:.1}%",
        summary.data_quality_score_before * 100.0,
        summary.data_quality_score_after * 100.0
    );
    println!(
        "  Invalid values: {} ({:.2}% of checked cells)",
        summary.invalid_values,
        report.quality_assessment.invalid_ratio * 100.0
    );
    println!();

    let changed: Vec<_> = report
        .actions
        .iter()
        .filter(|a| a.rows_affected > 0)
        .collect();
    if !changed.is_empty() {
        println!("Actions Taken:");
        for action in changed {
            println!("  - {}", action.description);
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sales-prep").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_prepare_everything() {
        let args = parse(&[]);
        assert_eq!(args.table, CliTable::All);
        assert_eq!(args.table.kinds().len(), 5);

        let config = build_config(&args).unwrap();
        assert_eq!(config, PrepareConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&[
            "-t",
            "products",
            "-i",
            "raw",
            "--null-invalid-numbers",
            "--max-invalid-ratio",
            "0.1",
            "--date-format",
            "%d/%m/%Y",
            "-r",
        ]);

        let config = build_config(&args).unwrap();

        assert_eq!(args.table.kinds(), vec![TableKind::Products]);
        assert_eq!(config.input_dir, PathBuf::from("raw"));
        assert_eq!(config.numeric_fallback, NumericFallback::Null);
        assert_eq!(config.max_invalid_ratio, 0.1);
        assert_eq!(config.date_formats.output_format, "%d/%m/%Y");
        assert!(config.generate_reports);
    }

    #[test]
    fn test_conflicting_numeric_flags() {
        let result = Args::try_parse_from([
            "sales-prep",
            "--numeric-default",
            "1",
            "--null-invalid-numbers",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let args = parse(&["--max-invalid-ratio", "2"]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_non_finite_numeric_default_rejected() {
        for value in ["NaN", "inf", "-inf"] {
            let args = parse(&["--numeric-default", value]);
            assert!(build_config(&args).is_err(), "{} accepted", value);
        }
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("sale_id", 10), "sale_id");
        assert_eq!(truncate_str("a_very_long_column_name", 10), "a_very_...");
    }
}
