//! Error types for overlay and recovery.

use thiserror::Error;

/// Fatal errors raised by `overlay`, `recover` and the IO helpers.
///
/// Unmatched postal codes are not errors: those units are routed to the
/// unrecoverable set of a [`crate::RecoverResult`].
#[derive(Error, Debug)]
pub enum Error {
    /// A required collection is absent or has no rows.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// A named column is absent from its collection (schema error).
    #[error("column {column:?} not found in {collection}")]
    MissingColumn { collection: &'static str, column: String },

    /// A declared unique-id column contains a repeated value.
    #[error("duplicate identifier {id:?} in column {column:?} of {collection}")]
    DuplicateIdentifier { collection: &'static str, column: String, id: String },

    /// A declared unique-id column contains a null.
    #[error("null identifier at row {row} in column {column:?} of {collection}")]
    NullIdentifier { collection: &'static str, column: String, row: usize },

    /// A polygon could not be repaired into a valid, non-empty geometry.
    #[error("invalid geometry for {collection} feature {id:?}: {reason}")]
    InvalidGeometry { collection: &'static str, id: String, reason: String },

    /// A located point is missing a usable coordinate.
    #[error("point {id:?} has no valid coordinate in column {column:?}")]
    InvalidCoordinate { id: String, column: String },

    /// Inconsistent configuration (e.g. a region filter value without a field).
    #[error("configuration error: {0}")]
    Config(String),

    /// Unsupported coordinate reference system or failed transform.
    #[error("projection error: {0}")]
    Projection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataframe error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for qor operations.
pub type Result<T> = std::result::Result<T, Error>;
