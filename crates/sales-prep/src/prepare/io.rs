//! CSV reading and writing for raw and prepared tables.

use crate::error::{Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::debug;

/// Read a raw CSV file with every column as `String`.
///
/// Type inference is disabled so that messy values such as `19.99$` reach
/// the scrubber intact instead of failing the read. Empty fields are null.
pub fn read_raw_table(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Opening {}", path.display()))?
        .finish()
        .context(format!("Reading {}", path.display()))?;

    debug!(
        "Read {}: {} rows x {} columns",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Write `df` as a headed, comma-separated CSV, replacing any existing file.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
    }

    let mut file = File::create(path).context(format!("Creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Writing {}", path.display()))?;

    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_keeps_raw_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products_data.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "ProductID,UnitPrice,StockQuantity").unwrap();
        writeln!(file, "101,19.99$,5").unwrap();
        writeln!(file, "102,,7").unwrap();
        drop(file);

        let df = read_raw_table(&path).unwrap();

        assert_eq!(df.height(), 2);
        for col in df.get_columns() {
            assert_eq!(col.dtype(), &DataType::String);
        }
        let prices = df.column("UnitPrice").unwrap();
        assert_eq!(prices.str().unwrap().get(0), Some("19.99$"));
        assert_eq!(prices.null_count(), 1);
    }

    #[test]
    fn test_missing_file_is_io_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_raw_table(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.to_string().contains("absent.csv"));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stores_data_prepared.csv");
        let mut df = df!["store_id" => [1.0, 2.0], "store_name" => ["North", "South"]].unwrap();

        write_table(&mut df, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("store_id,store_name"));
    }
}
