//! Report generation module.
//!
//! [`PreparationReport`] serves both outputs of the CLI:
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--emit-report` CLI flag)
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_prep::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report(&prepared);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let generator = ReportGenerator::new("data/prepared");
//! generator.write_report_to_file(&report)?;
//! ```

mod generator;

pub use generator::{DryRunReport, PreparationReport, QualityAssessment, ReportGenerator};
