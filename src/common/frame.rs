use std::sync::Arc;

use ahash::AHashSet;
use polars::prelude::*;

use crate::error::{Error, Result};

/// Look up a column by name, mapping absence to a schema error.
pub(crate) fn require_column<'a>(df: &'a DataFrame, column: &str, collection: &'static str) -> Result<&'a Column> {
    df.column(column)
        .map_err(|_| Error::MissingColumn { collection, column: column.to_string() })
}

/// Read a column as optional strings. Non-string columns are cast, so numeric
/// ids and postal codes come back in their display form.
pub(crate) fn string_values(df: &DataFrame, column: &str, collection: &'static str) -> Result<Vec<Option<String>>> {
    let values = require_column(df, column, collection)?.cast(&DataType::String)?;
    Ok(values.str()?.into_iter().map(|value| value.map(str::to_owned)).collect())
}

/// Read a column as optional finite floats; blanks and unparseable text become None.
pub(crate) fn float_values(df: &DataFrame, column: &str, collection: &'static str) -> Result<Vec<Option<f64>>> {
    Ok(string_values(df, column, collection)?.into_iter()
        .map(|value| value
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|x| x.is_finite()))
        .collect())
}

/// Read a declared unique-id column, failing on nulls and repeated values.
pub(crate) fn unique_ids(df: &DataFrame, column: &str, collection: &'static str) -> Result<Vec<Arc<str>>> {
    let ids = string_values(df, column, collection)?.into_iter()
        .enumerate()
        .map(|(row, value)| value
            .map(Arc::<str>::from)
            .ok_or_else(|| Error::NullIdentifier { collection, column: column.to_string(), row }))
        .collect::<Result<Vec<_>>>()?;

    ensure_unique(&ids, column, collection)?;
    Ok(ids)
}

/// Fail with the first repeated identifier, if any.
pub(crate) fn ensure_unique(ids: &[Arc<str>], column: &str, collection: &'static str) -> Result<()> {
    let mut seen = AHashSet::with_capacity(ids.len());
    match ids.iter().find(|&id| !seen.insert(id.as_ref())) {
        Some(id) => Err(Error::DuplicateIdentifier { collection, column: column.to_string(), id: id.to_string() }),
        None => Ok(()),
    }
}

/// Keep the rows of `df` whose mask entry is true, preserving order.
pub(crate) fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), keep);
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("id".into(), ["a", "b", "c"]),
            Column::new("zip".into(), [27601i64, 2134, 27705]),
            Column::new("lon".into(), ["-78.6", " -78.7 ", "n/a"]),
        ]).unwrap()
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        match require_column(&frame(), "nope", "points") {
            Err(Error::MissingColumn { collection, column }) => {
                assert_eq!(collection, "points");
                assert_eq!(column, "nope");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn numeric_columns_read_as_strings() {
        let zips = string_values(&frame(), "zip", "units").unwrap();
        assert_eq!(zips, vec![Some("27601".into()), Some("2134".into()), Some("27705".into())]);
    }

    #[test]
    fn floats_parse_with_whitespace_and_reject_text() {
        let lons = float_values(&frame(), "lon", "points").unwrap();
        assert_eq!(lons, vec![Some(-78.6), Some(-78.7), None]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let df = DataFrame::new(vec![Column::new("id".into(), ["a", "b", "a"])]).unwrap();
        match unique_ids(&df, "id", "points") {
            Err(Error::DuplicateIdentifier { id, .. }) => assert_eq!(id, "a"),
            other => panic!("expected DuplicateIdentifier, got {other:?}"),
        }
    }

    #[test]
    fn null_ids_are_rejected() {
        let df = DataFrame::new(vec![Column::new("id".into(), [Some("a"), None])]).unwrap();
        assert!(matches!(unique_ids(&df, "id", "points"), Err(Error::NullIdentifier { row: 1, .. })));
    }

    #[test]
    fn filter_rows_keeps_order() {
        let kept = filter_rows(&frame(), &[true, false, true]).unwrap();
        let ids = string_values(&kept, "id", "points").unwrap();
        assert_eq!(ids, vec![Some("a".into()), Some("c".into())]);
    }
}
