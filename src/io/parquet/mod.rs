//! Parquet reading and writing operations.

use std::{fs::File, path::Path};

use polars::{frame::DataFrame, io::SerReader, prelude::{ParquetReader, ParquetWriter}};

use crate::error::Result;

/// Reads a Polars DataFrame from a Parquet file at `path`.
pub(crate) fn read_parquet(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    Ok(ParquetReader::new(file).finish()?)
}

/// Writes a Polars DataFrame to a Parquet file at `path`.
pub(crate) fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    ParquetWriter::new(file).finish(df)?;
    Ok(())
}
