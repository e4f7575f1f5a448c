use crate::error::{Result, ResultExt};
use crate::prepare::PreparedTable;
use crate::schema::TableKind;
use crate::types::{ConsistencyReport, PreparationSummary, ScrubAction};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Everything known about one table's preparation run.
///
/// Used both for `--json` output and for `<table>_report.json` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparationReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub table: TableKind,
    /// Path to the raw input file (absent for in-memory runs)
    pub input_file: Option<String>,
    /// Path to the prepared CSV (if written)
    pub output_file: Option<String>,

    pub summary: PreparationSummary,
    pub quality_assessment: QualityAssessment,

    /// Scrubber steps in execution order
    pub actions: Vec<ScrubAction>,
}

/// Table shape and completeness before and after cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub before: ConsistencyReport,
    pub after: ConsistencyReport,
    /// Invalid values over checked numeric and date cells.
    pub invalid_ratio: f64,
    /// Completeness gained, in percentage points.
    pub improvement: f64,
}

/// Consistency snapshot of a raw file, produced by dry runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryRunReport {
    pub table: TableKind,
    pub input_file: String,
    pub consistency: ConsistencyReport,
    pub planned_steps: Vec<String>,
}

// ============================================================================
// Report Generator
// ============================================================================

/// Writes preparation reports to an output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build a report from a finished preparation.
    pub fn build_report(prepared: &PreparedTable) -> PreparationReport {
        let before = prepared.before.completeness();
        let after = prepared.after.completeness();

        PreparationReport {
            generated_at: Local::now().to_rfc3339(),
            table: prepared.kind,
            input_file: prepared
                .input_path
                .as_ref()
                .map(|p| p.display().to_string()),
            output_file: prepared
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
            summary: prepared.summary.clone(),
            quality_assessment: QualityAssessment {
                before: prepared.before.clone(),
                after: prepared.after.clone(),
                invalid_ratio: prepared.invalid_ratio,
                improvement: (after - before) * 100.0,
            },
            actions: prepared.actions.clone(),
        }
    }

    /// Write a report as pretty JSON to `<output_dir>/<table>_report.json`.
    pub fn write_report_to_file(&self, report: &PreparationReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .context(format!("Creating {}", self.output_dir.display()))?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report.table.name()));
        let mut file =
            File::create(&report_path).context(format!("Creating {}", report_path.display()))?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())
            .context(format!("Writing {}", report_path.display()))?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
