//! Inputs handed over by the Query (geocoding) stage.
//!
//! A geocoder output table has one row per unit: an id, two coordinate
//! columns that are blank when the address could not be located, and
//! optionally the unit's postal code. Located rows become a [`PointSet`] for
//! overlay; failed rows become [`Units`] for recovery.

use std::sync::Arc;

use geo::Point;
use polars::prelude::DataFrame;

use crate::{
    common::{filter_rows, float_values, string_values, unique_ids},
    config::{PointFields, UnitFields},
    error::{Error, Result},
    geom::Crs,
};

/// Located points with unique ids, in the CRS of record.
#[derive(Debug, Clone)]
pub struct PointSet {
    ids: Vec<Arc<str>>,
    points: Vec<Point<f64>>,
    crs: Crs,
}

impl PointSet {
    /// Read ids and coordinates from `df`. Every row must carry both coordinates.
    pub fn from_dataframe(df: &DataFrame, fields: &PointFields, crs: Crs) -> Result<Self> {
        let ids = unique_ids(df, &fields.id, "points")?;
        let xs = float_values(df, &fields.x, "points")?;
        let ys = float_values(df, &fields.y, "points")?;

        let points = ids.iter().zip(xs.into_iter().zip(ys))
            .map(|(id, coords)| match coords {
                (Some(x), Some(y)) => Ok(Point::new(x, y)),
                (None, _) => Err(Error::InvalidCoordinate { id: id.to_string(), column: fields.x.clone() }),
                (_, None) => Err(Error::InvalidCoordinate { id: id.to_string(), column: fields.y.clone() }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { ids, points, crs })
    }

    /// Split a geocoder output table into (located, failed) rows.
    /// A row is located when both coordinates parse as finite numbers.
    pub fn split_located(df: &DataFrame, fields: &PointFields) -> Result<(DataFrame, DataFrame)> {
        let xs = float_values(df, &fields.x, "points")?;
        let ys = float_values(df, &fields.y, "points")?;

        let located = xs.iter().zip(&ys)
            .map(|(x, y)| x.is_some() && y.is_some())
            .collect::<Vec<_>>();
        let failed = located.iter().map(|&ok| !ok).collect::<Vec<_>>();

        Ok((filter_rows(df, &located)?, filter_rows(df, &failed)?))
    }

    #[inline] pub fn len(&self) -> usize { self.ids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    #[inline] pub fn ids(&self) -> &[Arc<str>] { &self.ids }

    #[inline] pub fn points(&self) -> &[Point<f64>] { &self.points }

    #[inline] pub fn crs(&self) -> Crs { self.crs }
}

/// Unlocated units awaiting recovery: unique ids with their postal codes as provided.
#[derive(Debug, Clone)]
pub struct Units {
    ids: Vec<Arc<str>>,
    zips: Vec<Option<String>>,
}

impl Units {
    pub fn from_dataframe(df: &DataFrame, fields: &UnitFields) -> Result<Self> {
        let ids = unique_ids(df, &fields.id, "units")?;
        let zips = string_values(df, &fields.zip, "units")?;
        Ok(Self { ids, zips })
    }

    /// Units that have no postal code column at all (every code absent).
    pub(crate) fn without_zips(df: &DataFrame, id: &str) -> Result<Self> {
        let ids = unique_ids(df, id, "units")?;
        let zips = vec![None; ids.len()];
        Ok(Self { ids, zips })
    }

    #[inline] pub fn len(&self) -> usize { self.ids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    #[inline] pub fn ids(&self) -> &[Arc<str>] { &self.ids }

    #[inline] pub fn zips(&self) -> &[Option<String>] { &self.zips }
}
