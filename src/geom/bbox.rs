use geo::Rect;
use rstar::{RTreeObject, AABB};

/// R-tree entry: the envelope of one shape and that shape's row.
#[derive(Debug, Clone)]
pub(super) struct BoundingBox {
    row: usize,
    envelope: AABB<[f64; 2]>,
}

impl BoundingBox {
    pub(super) fn new(row: usize, rect: Rect<f64>) -> Self {
        Self { row, envelope: AABB::from_corners(rect.min().into(), rect.max().into()) }
    }

    #[inline] pub(super) fn row(&self) -> usize { self.row }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { self.envelope }
}
