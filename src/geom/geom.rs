use geo::{unary_union, BoundingRect, Centroid, Intersects, MultiPolygon, Point, Relate};
use rstar::{RTree, AABB};
use smallvec::SmallVec;

use crate::geom::{BoundingBox, Crs};

/// Geometries represents a collection of MultiPolygons in one CRS, indexed by an R-tree.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
    crs: Crs,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Empty shapes are kept (so indices line up with attribute rows) but never indexed.
    pub(crate) fn new(shapes: Vec<MultiPolygon<f64>>, crs: Crs) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            shapes,
            crs,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no MultiPolygons.
    #[inline] pub(crate) fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub(crate) fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Get the coordinate reference system of the shapes.
    #[inline] pub(crate) fn crs(&self) -> Crs { self.crs }

    /// Query the R-tree for bounding boxes intersecting the given envelope.
    #[inline]
    fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = &BoundingBox> {
        self.rtree.locate_in_envelope_intersecting(envelope)
    }

    /// Indices of all shapes intersecting `point` (boundary inclusive), in ascending order.
    pub(crate) fn locate(&self, point: &Point<f64>) -> SmallVec<[u32; 4]> {
        // Degenerate AABB at the point; bbox candidates are refined with an exact test.
        let envelope = AABB::from_point([point.x(), point.y()]);
        let mut hits = self.query(&envelope)
            .map(BoundingBox::row)
            .filter(|&i| self.shapes[i].intersects(point))
            .map(|i| i as u32)
            .collect::<SmallVec<[u32; 4]>>();
        hits.sort_unstable();
        hits
    }

    /// Indices of all shapes sharing area with `other`, in ascending order.
    /// Pure boundary touches (edge or point) are NOT considered overlaps.
    pub(crate) fn overlapping(&self, other: &MultiPolygon<f64>) -> Vec<usize> {
        let Some(rect) = other.bounding_rect() else { return Vec::new() };
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
        let mut hits = self.query(&envelope)
            .map(BoundingBox::row)
            .filter(|&i| {
                let im = self.shapes[i].relate(other);
                im.is_intersects() && !im.is_touches()
            })
            .collect::<Vec<_>>();
        hits.sort_unstable();
        hits
    }

    /// Build a new collection from the shapes at `indices`, in the given order.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        Self::new(indices.iter().map(|&i| self.shapes[i].clone()).collect(), self.crs)
    }

    /// Compute the centroids of all MultiPolygons (None for empty shapes).
    pub(crate) fn centroids(&self) -> Vec<Option<Point<f64>>> {
        self.shapes.iter().map(|shape| shape.centroid()).collect()
    }

    /// Compute the union of all MultiPolygons into a single MultiPolygon.
    /// This method may be slow for large numbers of complex polygons.
    pub(crate) fn union(&self) -> MultiPolygon<f64> {
        unary_union(&self.shapes)
    }
}
