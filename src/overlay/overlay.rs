use std::sync::Arc;

use geo::Point;
use polars::prelude::{Column, DataFrame};

use crate::{
    config::{LayerFields, OverlayConfig, RegionFilter},
    error::Result,
    layer::Layer,
    overlay::{assign::assign, classify::{Bucket, Classification}, distance::DistanceTable},
    points::PointSet,
    progress::Progress,
};

/// One point's polygon assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub point_id: Arc<str>,
    pub polygon_id: Arc<str>,
    /// Distance to the chosen polygon's interior point; None for single containment.
    pub distance: Option<f64>,
    pub bucket: Bucket,
}

/// Ids of the points that needed distance resolution, by bucket, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub single: usize,
    pub multiple: Vec<Arc<str>>,
    pub none: Vec<Arc<str>>,
}

impl Diagnostics {
    /// Log the bucket counts, plus the unresolved ids at debug level.
    pub fn log(&self) {
        tracing::info!(
            single = self.single,
            multiple = self.multiple.len(),
            none = self.none.len(),
            "[overlay] classified {} points", self.single + self.multiple.len() + self.none.len(),
        );
        if !self.multiple.is_empty() {
            tracing::debug!(ids = ?self.multiple, "[overlay] points on shared borders");
        }
        if !self.none.is_empty() {
            tracing::debug!(ids = ?self.none, "[overlay] points outside every polygon");
        }
    }
}

/// Overlay output: one record per input point, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayResult {
    pub records: Vec<MatchRecord>,
    pub diagnostics: Diagnostics,
}

impl OverlayResult {
    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Columns: `point_id`, `polygon_id`, `distance` (null when contained), `bucket`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let point_ids = self.records.iter().map(|r| r.point_id.as_ref()).collect::<Vec<_>>();
        let polygon_ids = self.records.iter().map(|r| r.polygon_id.as_ref()).collect::<Vec<_>>();
        let distances = self.records.iter().map(|r| r.distance).collect::<Vec<_>>();
        let buckets = self.records.iter().map(|r| r.bucket.as_str()).collect::<Vec<_>>();

        Ok(DataFrame::new(vec![
            Column::new("point_id".into(), point_ids),
            Column::new("polygon_id".into(), polygon_ids),
            Column::new("distance".into(), distances),
            Column::new("bucket".into(), buckets),
        ])?)
    }
}

/// Assign every point in `points` to exactly one polygon of `polygons`.
///
/// Points inside one polygon take it; points on a shared border take the
/// nearest of the polygons they touch; points outside every polygon take the
/// nearest polygon overall. "Nearest" is measured to each polygon's interior
/// point, with ties going to the lowest polygon id.
///
/// All input validation (columns, ids, coordinates, region filter) happens
/// before any geometry is repaired or projected.
pub fn overlay(
    points: &DataFrame,
    polygons: &Layer,
    config: &OverlayConfig,
    progress: &dyn Progress,
) -> Result<OverlayResult> {
    let points = PointSet::from_dataframe(points, &config.points, config.crs)?;
    overlay_points(&points, polygons, &config.polygons, &config.region, progress)
}

/// [`overlay`] for points that have already been read into a [`PointSet`].
pub fn overlay_points(
    points: &PointSet,
    polygons: &Layer,
    fields: &LayerFields,
    region: &RegionFilter,
    progress: &dyn Progress,
) -> Result<OverlayResult> {
    let (polygons, polygon_ids) = polygons.resolve(fields, region, "polygons")?;

    let geoms = polygons.prepared_geoms(&polygon_ids, points.crs(), "polygons")?;
    let anchors = geoms.interior_points(&polygon_ids, "polygons")?;
    tracing::debug!(polygons = geoms.len(), crs = %points.crs(), "[overlay] prepared polygons");

    let classification = Classification::new(points.points(), &geoms, progress);
    let unresolved = classification.unresolved();

    let assignments = {
        let rows = unresolved.iter().map(|&i| points.points()[i]).collect::<Vec<Point<f64>>>();
        let table = DistanceTable::compute(&rows, &anchors, points.crs(), progress)?;
        assign(&classification, &unresolved, &table, &polygon_ids)?
    };

    let ids_in = |bucket| classification.indices(bucket).into_iter()
        .map(|i| points.ids()[i].clone())
        .collect::<Vec<_>>();
    let diagnostics = Diagnostics {
        single: classification.len() - unresolved.len(),
        multiple: ids_in(Bucket::Multiple),
        none: ids_in(Bucket::NoMatch),
    };

    let records = assignments.into_iter().enumerate()
        .map(|(i, (j, distance))| MatchRecord {
            point_id: points.ids()[i].clone(),
            polygon_id: polygon_ids[j].clone(),
            distance,
            bucket: classification.bucket(i),
        })
        .collect();

    diagnostics.log();
    Ok(OverlayResult { records, diagnostics })
}
