#![doc = "qor: point-to-polygon overlay with postal-code recovery"]
mod common;
mod config;
mod error;
mod geom;
mod io;
mod layer;
mod overlay;
mod pipeline;
mod points;
mod progress;
mod recover;

#[doc(inline)]
pub use config::{LayerFields, OverlayConfig, PointFields, RecoverConfig, RegionFilter, UnitFields};

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use geom::Crs;

#[doc(inline)]
pub use io::{read_table, write_table};

#[doc(inline)]
pub use layer::Layer;

#[doc(inline)]
pub use overlay::{overlay, overlay_points, Bucket, Diagnostics, MatchRecord, OverlayResult};

#[doc(inline)]
pub use pipeline::{link, run_batch, run_job, Batch, JobConfig, JobOutcome, LinkResult, LinkSummary, Recovery};

#[doc(inline)]
pub use points::{PointSet, Units};

#[doc(inline)]
pub use progress::{LogProgress, Progress, Stage};

#[doc(inline)]
pub use recover::{normalize_zip, recover, recover_units, RecoverResult, RecoveryRecord, Unrecoverable};
