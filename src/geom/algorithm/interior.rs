use std::sync::Arc;

use geo::{Centroid, Contains, InteriorPoint, Point};

use crate::{error::{Error, Result}, geom::Geometries};

impl Geometries {
    /// For each shape, a representative point strictly inside its area.
    ///
    /// Unlike a centroid, this can't fall outside a concave or multi-part shape,
    /// so it is a stable proxy for the shape's location in distance comparisons.
    pub(crate) fn interior_points(&self, ids: &[Arc<str>], collection: &'static str) -> Result<Vec<Point<f64>>> {
        self.shapes().iter().zip(ids)
            .map(|(shape, id)| {
                // Guaranteed interior point for areal geometries; fall back to the centroid
                // if the interior point landed on the boundary of a sliver.
                shape.interior_point()
                    .filter(|pt| shape.contains(pt))
                    .or_else(|| shape.centroid().filter(|pt| shape.contains(pt)))
                    .ok_or_else(|| Error::InvalidGeometry {
                        collection,
                        id: id.to_string(),
                        reason: "no point lies strictly inside the shape".into(),
                    })
            })
            .collect()
    }
}
