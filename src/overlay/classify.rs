use std::fmt;

use geo::Point;
use smallvec::SmallVec;

use crate::{geom::Geometries, progress::{Progress, Stage}};

/// How many polygons a point intersects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Exactly one polygon; assigned directly.
    Single,
    /// No polygon; resolved against every polygon's interior point.
    NoMatch,
    /// Two or more polygons (e.g. on a shared border); resolved among those only.
    Multiple,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Single => "single",
            Bucket::NoMatch => "none",
            Bucket::Multiple => "multiple",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Polygons intersecting each point (boundary inclusive), in point order.
/// Every point falls in exactly one bucket, determined by its hit count.
#[derive(Debug, Clone)]
pub(crate) struct Classification {
    hits: Vec<SmallVec<[u32; 4]>>,
}

impl Classification {
    pub(crate) fn new(points: &[Point<f64>], geoms: &Geometries, progress: &dyn Progress) -> Self {
        let total = points.len();
        let hits = points.iter().enumerate()
            .map(|(i, point)| {
                let hits = geoms.locate(point);
                progress.report(Stage::Classify, i + 1, total);
                hits
            })
            .collect();
        Self { hits }
    }

    #[inline] pub(crate) fn len(&self) -> usize { self.hits.len() }

    /// Indices of the polygons intersecting point `i`, ascending.
    #[inline] pub(crate) fn hits(&self, i: usize) -> &[u32] { &self.hits[i] }

    #[inline]
    pub(crate) fn bucket(&self, i: usize) -> Bucket {
        match self.hits[i].len() {
            0 => Bucket::NoMatch,
            1 => Bucket::Single,
            _ => Bucket::Multiple,
        }
    }

    /// Point indices in `bucket`, ascending.
    pub(crate) fn indices(&self, bucket: Bucket) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.bucket(i) == bucket).collect()
    }

    /// Point indices needing distance resolution (`none` and `multiple`), ascending.
    pub(crate) fn unresolved(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.bucket(i) != Bucket::Single).collect()
    }
}
