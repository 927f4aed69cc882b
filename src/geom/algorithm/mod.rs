mod interior;
mod proj;
mod repair;

pub(crate) use proj::{planar_distance, to_planar};
