use std::{borrow::Cow, path::Path, sync::Arc};

use geo::MultiPolygon;
use polars::prelude::{Column, DataFrame};

use crate::{
    common::{filter_rows, require_column, string_values, unique_ids},
    config::{LayerFields, RegionFilter},
    error::{Error, Result},
    geom::{Crs, Geometries},
    io::shp::read_shapefile,
};

/// A polygon layer: one attribute row per shape, in one CRS.
#[derive(Debug, Clone)]
pub struct Layer {
    data: DataFrame,
    geoms: Geometries,
}

impl Layer {
    /// Pair an attribute table with its shapes (row `i` describes shape `i`).
    pub fn new(data: DataFrame, shapes: Vec<MultiPolygon<f64>>, crs: Crs) -> Result<Self> {
        if data.height() != shapes.len() {
            return Err(Error::Config(format!(
                "layer has {} attribute rows but {} shapes", data.height(), shapes.len()
            )));
        }
        Ok(Self { data, geoms: Geometries::new(shapes, crs) })
    }

    /// Build a layer whose only attribute is an id column.
    pub fn from_ids(column: &str, ids: &[&str], shapes: Vec<MultiPolygon<f64>>, crs: Crs) -> Result<Self> {
        Self::new(DataFrame::new(vec![Column::new(column.into(), ids)])?, shapes, crs)
    }

    /// Load a polygon shapefile. Every attribute is read as a string column.
    /// The CRS comes from the sibling `.prj`, defaulting to NAD83 lon/lat when the
    /// file is absent or names an unknown geographic CRS.
    pub fn from_shapefile(path: &Path) -> Result<Self> {
        let contents = read_shapefile(path)?;
        let crs = match contents.epsg {
            Some(epsg) => Crs::from_epsg(epsg),
            None => {
                tracing::warn!(path = %path.display(), "[layer] no recognizable geographic .prj; assuming {}", Crs::NAD83);
                Crs::NAD83
            }
        };
        tracing::debug!(path = %path.display(), features = contents.shapes.len(), %crs, "[layer] loaded shapefile");
        Self::new(contents.data, contents.shapes, crs)
    }

    /// Get the number of features.
    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    /// Check if there are no features.
    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    /// Get the attribute table.
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Get the shapes, in attribute-row order.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { self.geoms.shapes() }

    /// Get the coordinate reference system of the shapes.
    #[inline] pub fn crs(&self) -> Crs { self.geoms.crs() }

    /// Keep the features at `indices` (ascending), attributes and shapes together.
    pub(crate) fn select(&self, indices: &[usize]) -> Result<Layer> {
        let mut keep = vec![false; self.len()];
        for &i in indices { keep[i] = true }
        Ok(Self { data: filter_rows(&self.data, &keep)?, geoms: self.geoms.select(indices) })
    }

    /// Keep only the features whose `field` equals `value`.
    fn filter_region(&self, field: &str, value: &str, collection: &'static str) -> Result<Layer> {
        let indices = string_values(&self.data, field, collection)?.iter()
            .enumerate()
            .filter(|(_, code)| code.as_deref().map(str::trim) == Some(value.trim()))
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        if indices.is_empty() {
            return Err(Error::Config(format!(
                "region filter {field} == {value:?} matches no features in {collection}"
            )));
        }
        tracing::debug!(collection, field, value, kept = indices.len(), total = self.len(), "[layer] applied region filter");
        self.select(&indices)
    }

    /// Validate this layer as a matching target, before any geometry work:
    /// it must have features, carry the id column, satisfy the region filter,
    /// and have unique ids after filtering.
    pub(crate) fn resolve(
        &self,
        fields: &LayerFields,
        region: &RegionFilter,
        collection: &'static str,
    ) -> Result<(Cow<'_, Layer>, Vec<Arc<str>>)> {
        if self.is_empty() {
            return Err(Error::MissingInput(format!("{collection} layer has no features")));
        }
        require_column(&self.data, &fields.id, collection)?;

        let layer = match region.resolve()? {
            Some((field, value)) => Cow::Owned(self.filter_region(field, value, collection)?),
            None => Cow::Borrowed(self),
        };
        let ids = unique_ids(&layer.data, &fields.id, collection)?;
        Ok((layer, ids))
    }

    /// Repaired copy of the shapes, reprojected into `crs`.
    pub(crate) fn prepared_geoms(&self, ids: &[Arc<str>], crs: Crs, collection: &'static str) -> Result<Geometries> {
        self.geoms.repaired(ids, collection)?.reproject(crs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x0: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: 0.0), (x: x0 + 1.0, y: 0.0), (x: x0 + 1.0, y: 1.0), (x: x0, y: 1.0), (x: x0, y: 0.0),
        ]])
    }

    fn districts() -> Layer {
        let data = DataFrame::new(vec![
            Column::new("GEOID".into(), ["3700001", "3700002", "4500001"]),
            Column::new("STATEFP".into(), ["37", "37", "45"]),
        ]).unwrap();
        Layer::new(data, vec![square(0.0), square(1.0), square(5.0)], Crs::from_epsg(26917)).unwrap()
    }

    #[test]
    fn mismatched_rows_and_shapes_fail() {
        let data = DataFrame::new(vec![Column::new("GEOID".into(), ["a"])]).unwrap();
        assert!(matches!(Layer::new(data, vec![], Crs::NAD83), Err(Error::Config(_))));
    }

    #[test]
    fn resolve_without_filter_borrows() {
        let layer = districts();
        let (resolved, ids) = layer.resolve(&LayerFields::default(), &RegionFilter::default(), "polygons").unwrap();
        assert!(matches!(resolved, Cow::Borrowed(_)));
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn resolve_applies_region_filter() {
        let layer = districts();
        let (resolved, ids) = layer
            .resolve(&LayerFields::default(), &RegionFilter::new("STATEFP", "37"), "polygons")
            .unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.data().height(), 2);
        assert_eq!(ids.iter().map(|id| id.as_ref()).collect::<Vec<_>>(), vec!["3700001", "3700002"]);
    }

    #[test]
    fn region_value_matching_nothing_is_a_config_error() {
        let layer = districts();
        let result = layer.resolve(&LayerFields::default(), &RegionFilter::new("STATEFP", "06"), "polygons");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn missing_region_field_is_a_schema_error() {
        let layer = districts();
        let result = layer.resolve(&LayerFields::default(), &RegionFilter::new("STATE", "37"), "polygons");
        assert!(matches!(result, Err(Error::MissingColumn { .. })));
    }

    #[test]
    fn missing_id_column_is_a_schema_error() {
        let layer = districts();
        let result = layer.resolve(&LayerFields::new("DISTRICT"), &RegionFilter::default(), "polygons");
        assert!(matches!(result, Err(Error::MissingColumn { .. })));
    }

    #[test]
    fn empty_layer_is_missing_input() {
        let layer = Layer::from_ids("GEOID", &[], vec![], Crs::NAD83).unwrap();
        let result = layer.resolve(&LayerFields::default(), &RegionFilter::default(), "polygons");
        assert!(matches!(result, Err(Error::MissingInput(_))));
    }
}
