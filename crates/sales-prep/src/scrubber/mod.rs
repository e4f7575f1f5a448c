//! Table scrubbing operations.
//!
//! Every operation takes a borrowed [`DataFrame`] and returns a new frame
//! together with a [`ScrubAction`](crate::types::ScrubAction) describing what
//! changed. Nothing here performs I/O or logs; malformed values are resolved
//! by the documented fallback policies and surface only as counts.
//!
//! Operations compose in any order that respects column-name dependencies:
//! [`standardize_column_names`] must run before anything that refers to
//! canonical names.

mod columns;
mod dates;
mod inspect;
mod numeric;
mod rows;
mod strings;

pub use columns::{
    RenameMap, conform_to_schema, drop_columns, normalize_column_names, standardize_column_names,
};
pub use dates::{DEFAULT_INPUT_FORMATS, DEFAULT_OUTPUT_FORMAT, DateFormats, normalize_date};
pub use inspect::inspect;
pub use numeric::{NumericFallback, NumericRange, cast_integral, coerce_numeric, filter_range};
pub use rows::{FillValue, drop_duplicates, drop_missing, fill_missing};
pub use strings::{TextCase, change_case, trim_and_normalize_strings};
