use geo::{Coord, MapCoords, MultiPolygon, Point, Rect};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::{error::{Error, Result}, geom::{Crs, Geometries}};

/// Coordinate transform between two PROJ.4 definitions (degrees ↔ radians handled in code).
pub(crate) struct Transformer {
    from: Proj4,
    to: Proj4,
    from_geographic: bool,
    to_geographic: bool,
}

impl Transformer {
    fn from_proj_strings(from: &str, from_geographic: bool, to: &str, to_geographic: bool) -> Result<Self> {
        let build = |proj_string: &str| Proj4::from_proj_string(proj_string)
            .map_err(|e| Error::Projection(format!("failed to build PROJ.4 {proj_string:?}: {e}")));

        Ok(Self { from: build(from)?, to: build(to)?, from_geographic, to_geographic })
    }

    /// Transform between two EPSG-identified systems.
    pub(crate) fn new(from: Crs, to: Crs) -> Result<Self> {
        Self::from_proj_strings(&from.proj4()?, from.is_geographic(), &to.proj4()?, to.is_geographic())
    }

    /// Transform from a geographic CRS into the UTM zone around `center` (lon/lat degrees),
    /// for Euclidean distance calculations in meters.
    pub(crate) fn to_local_metric(from: Crs, center: Coord<f64>) -> Result<Self> {
        Self::from_proj_strings(&from.proj4()?, from.is_geographic(), &from.local_utm_proj4(center), false)
    }

    /// Transform a single coordinate.
    pub(crate) fn coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let mut point = if self.from_geographic {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };

        transform(&self.from, &self.to, &mut point)
            .map_err(|e| Error::Projection(format!("transform failed at ({}, {}): {e}", coord.x, coord.y)))?;

        Ok(if self.to_geographic {
            Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
        } else {
            Coord { x: point.0, y: point.1 }
        })
    }

    /// Transform a list of points.
    pub(crate) fn points(&self, points: &[Point<f64>]) -> Result<Vec<Point<f64>>> {
        points.iter().map(|point| self.coord(point.0).map(Point::from)).collect()
    }

    /// Transform every vertex of a MultiPolygon.
    pub(crate) fn multipolygon(&self, shape: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        shape.try_map_coords(|coord| self.coord(coord))
    }
}

impl Geometries {
    /// Reproject shapes into `to`, returning a new collection (no-op copy if already there).
    pub(crate) fn reproject(&self, to: Crs) -> Result<Geometries> {
        if self.crs() == to { return Ok(self.clone()) }

        let transformer = Transformer::new(self.crs(), to)?;
        let projected = self.shapes().iter()
            .map(|shape| transformer.multipolygon(shape))
            .collect::<Result<Vec<_>>>()?;

        Ok(Geometries::new(projected, to))
    }
}

/// Bring two point sets into a common planar frame for distance computation.
/// Projected inputs are returned unchanged; geographic inputs are projected to
/// the local UTM zone around their joint bounds so distances come out in meters.
pub(crate) fn to_planar(rows: &[Point<f64>], cols: &[Point<f64>], crs: Crs) -> Result<(Vec<Point<f64>>, Vec<Point<f64>>)> {
    if !crs.is_geographic() { return Ok((rows.to_vec(), cols.to_vec())) }

    let Some(bounds) = joint_bounds(rows.iter().chain(cols)) else {
        return Ok((Vec::new(), Vec::new()));
    };

    let transformer = Transformer::to_local_metric(crs, bounds.center())?;
    Ok((transformer.points(rows)?, transformer.points(cols)?))
}

fn joint_bounds<'a>(points: impl Iterator<Item = &'a Point<f64>>) -> Option<Rect<f64>> {
    points
        .map(|p| Rect::new(p.0, p.0))
        .reduce(|a, b| Rect::new(
            Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
            Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
        ))
}

/// Euclidean distance between two points in a planar frame.
#[inline]
pub(crate) fn planar_distance(a: &Point<f64>, b: &Point<f64>) -> f64 {
    let d = a.0 - b.0;
    d.x.hypot(d.y)
}
