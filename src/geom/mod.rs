mod algorithm;
mod bbox;
mod crs;
mod geom;

use bbox::BoundingBox;
pub use crs::Crs;
pub(crate) use algorithm::{planar_distance, to_planar};
pub(crate) use geom::Geometries;
