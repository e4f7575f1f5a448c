//! Table preparation: the per-table cleaning sequence built on the scrubber.
//!
//! For every [`TableKind`](crate::schema::TableKind) the [`Preparer`] runs
//! the same fixed order of operations:
//!
//! 1. rename columns to canonical names
//! 2. trim and collapse whitespace
//! 3. coerce numeric columns
//! 4. normalize date columns, then check the invalid-value ratio
//! 5. fill defaults
//! 6. apply range rules
//! 7. drop duplicate keys
//! 8. drop rows missing required values
//! 9. project onto the canonical schema

mod io;
mod preparer;

pub use io::{read_raw_table, write_table};
pub use preparer::{PreparedTable, Preparer};
