mod assign;
mod classify;
mod distance;
mod overlay;

pub use classify::Bucket;
pub(crate) use distance::{nearest, DistanceTable};
pub use overlay::{overlay, overlay_points, Diagnostics, MatchRecord, OverlayResult};
