//! IO module for format-specific reading and writing operations.
//!
//! # Format Modules
//!
//! - `csv` - CSV format for point tables and result sets
//! - `parquet` - Parquet format for point tables and result sets (requires `parquet` feature)
//! - `shp` - Shapefile format for polygon layers

pub(crate) mod csv;
pub(crate) mod shp;

#[cfg(feature = "parquet")]
pub(crate) mod parquet;

use std::path::Path;

use polars::frame::DataFrame;

use crate::error::Result;

fn is_parquet(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
}

/// Read a table from CSV, or from Parquet when the path ends in `.parquet`.
///
/// CSV columns are all read as strings so identifiers and postal codes keep
/// their leading zeros.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    #[cfg(feature = "parquet")]
    if is_parquet(path) { return parquet::read_parquet(path) }

    csv::read_csv(path)
}

/// Write a table as CSV, or as Parquet when the path ends in `.parquet`.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    #[cfg(feature = "parquet")]
    if is_parquet(path) { return parquet::write_parquet(df, path) }

    csv::write_csv(df, path)
}
