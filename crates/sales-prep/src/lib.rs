//! Sales Data Preparation Library
//!
//! Cleans raw sales, customer, product, store and campaign extracts so they
//! match the column layout of a star-schema sales warehouse.
//!
//! # Overview
//!
//! - **Scrubbing**: pure, table-level operations over polars `DataFrame`s
//!   (renaming, trimming, numeric coercion, date normalization,
//!   deduplication, missing-value handling). See [`scrubber`].
//! - **Schemas**: the canonical column layout and cleaning rules of each
//!   warehouse table. See [`TableKind`].
//! - **Preparation**: a fixed per-table sequence of scrubbing steps with
//!   logging, a data-quality threshold and CSV output. See [`Preparer`].
//! - **Reports**: JSON summaries of what each run changed.
//!
//! Malformed values never raise errors. They are replaced by configurable
//! fallbacks and reported as counts; only schema violations and API misuse
//! fail.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sales_prep::{PrepareConfig, Preparer, TableKind};
//!
//! let config = PrepareConfig::builder()
//!     .input_dir("data/raw")
//!     .output_dir("data/prepared")
//!     .max_invalid_ratio(0.2)
//!     .build()?;
//!
//! let preparer = Preparer::new(config)?;
//! for kind in TableKind::ALL {
//!     let prepared = preparer.prepare_file(kind)?;
//!     println!("{}: {} rows", kind, prepared.summary.rows_after);
//! }
//! ```
//!
//! # Scrubbing directly
//!
//! ```rust,ignore
//! use sales_prep::scrubber::{coerce_numeric, standardize_column_names, NumericFallback, RenameMap};
//!
//! let map = RenameMap::new().with("Sale Amt", "sale_amount");
//! let (df, _) = standardize_column_names(&raw, &map, &["sale_amount"])?;
//! let (df, action) = coerce_numeric(&df, "sale_amount", NumericFallback::Value(0.0))?;
//! println!("{}", action.description);
//! ```

pub mod config;
pub mod error;
pub mod prepare;
pub mod reporting;
pub mod schema;
pub mod scrubber;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, PrepareConfig, PrepareConfigBuilder};
pub use error::{Result as ScrubResult, ResultExt, ScrubError};
pub use prepare::{PreparedTable, Preparer};
pub use reporting::{DryRunReport, PreparationReport, QualityAssessment, ReportGenerator};
pub use schema::TableKind;
pub use scrubber::{DateFormats, FillValue, NumericFallback, NumericRange, RenameMap, TextCase};
pub use types::{ActionType, ConsistencyReport, PreparationSummary, ScrubAction};
