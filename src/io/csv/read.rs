//! CSV reading operations.

use std::{fs::File, path::Path};

use polars::{frame::DataFrame, io::SerReader, prelude::CsvReadOptions};

use crate::error::Result;

/// Reads a CSV file from `path` into a Polars DataFrame, every column as String.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()?;
    Ok(df)
}

#[cfg(test)]
/// Reads CSV text into a Polars DataFrame, every column as String.
pub(crate) fn read_csv_string(csv: &str) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(std::io::Cursor::new(csv.as_bytes().to_vec()))
        .finish()?;
    Ok(df)
}
