//! End-to-end linkage of a geocoder output table, and batches of independent
//! linkage jobs (e.g. one per election year) run in parallel.

use std::{fs::File, path::{Path, PathBuf}};

use polars::prelude::DataFrame;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    common::{ensure_dir_exists, require_file_exists, unique_ids},
    config::{LayerFields, OverlayConfig, RecoverConfig, UnitFields},
    error::{Error, Result},
    io::{read_table, write_table},
    layer::Layer,
    overlay::{overlay_points, OverlayResult},
    points::{PointSet, Units},
    progress::{LogProgress, Progress},
    recover::{recover_units, RecoverResult, Unrecoverable},
};

/// Zip-area inputs for recovering the rows a geocoder could not locate.
#[derive(Debug, Clone, Copy)]
pub struct Recovery<'a> {
    pub zip_areas: &'a Layer,
    pub region_boundary: &'a Layer,
    pub zip_fields: &'a LayerFields,
}

/// Overlay of the located rows plus recovery of the failed ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkResult {
    pub overlay: OverlayResult,
    pub recovery: RecoverResult,
}

/// Row counts of a [`LinkResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSummary {
    pub located: usize,
    pub single: usize,
    pub multiple: usize,
    pub none: usize,
    pub recovered: usize,
    pub unrecoverable: usize,
}

impl LinkResult {
    pub fn summary(&self) -> LinkSummary {
        let diagnostics = &self.overlay.diagnostics;
        LinkSummary {
            located: self.overlay.len(),
            single: diagnostics.single,
            multiple: diagnostics.multiple.len(),
            none: diagnostics.none.len(),
            recovered: self.recovery.records.len(),
            unrecoverable: self.recovery.unrecoverable.len(),
        }
    }
}

/// Link every row of a geocoder output table to a polygon.
///
/// Rows with both coordinates go through overlay. Rows missing either go
/// through recovery when `recovery` is given (which needs `points.zip` set),
/// and straight to the unrecoverable set otherwise.
pub fn link(
    geocoded: &DataFrame,
    polygons: &Layer,
    recovery: Option<Recovery<'_>>,
    config: &OverlayConfig,
    progress: &dyn Progress,
) -> Result<LinkResult> {
    unique_ids(geocoded, &config.points.id, "points")?;
    let (located, failed) = PointSet::split_located(geocoded, &config.points)?;

    let unit_fields = config.points.zip.as_ref()
        .map(|zip| UnitFields { id: config.points.id.clone(), zip: zip.clone() });
    let units = match (&recovery, &unit_fields) {
        (Some(_), None) => return Err(Error::Config(
            "recovering unlocated rows requires a postal code column (points.zip)".into(),
        )),
        (_, Some(fields)) => Units::from_dataframe(&failed, fields)?,
        (None, None) => Units::without_zips(&failed, &config.points.id)?,
    };
    let points = PointSet::from_dataframe(&located, &config.points, config.crs)?;
    tracing::info!(located = points.len(), failed = units.len(), "[link] split geocoder output");

    let overlay = overlay_points(&points, polygons, &config.polygons, &config.region, progress)?;

    let recovery = match (recovery, unit_fields) {
        (Some(recovery), Some(units_fields)) => {
            let config = RecoverConfig {
                units: units_fields,
                polygons: config.polygons.clone(),
                zip_areas: recovery.zip_fields.clone(),
                region: config.region.clone(),
            };
            recover_units(&units, polygons, recovery.zip_areas, recovery.region_boundary, &config, progress)?
        }
        _ => RecoverResult {
            records: Vec::new(),
            unrecoverable: units.ids().iter().zip(units.zips())
                .map(|(unit_id, zip)| Unrecoverable { unit_id: unit_id.clone(), postal_code: zip.clone() })
                .collect(),
        },
    };

    Ok(LinkResult { overlay, recovery })
}

/// One linkage job: where its inputs live, how to read them, where to write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    /// Geocoder output table (CSV, or Parquet by extension).
    pub points: PathBuf,
    /// Polygon shapefile.
    pub polygons: PathBuf,
    /// Zip-area shapefile; enables recovery together with `region_boundary`.
    #[serde(default)]
    pub zip_areas: Option<PathBuf>,
    #[serde(default)]
    pub region_boundary: Option<PathBuf>,
    #[serde(default = "LayerFields::zcta")]
    pub zip_fields: LayerFields,
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Output directory, created if needed.
    pub output: PathBuf,
}

/// A JSON batch file: `{ "jobs": [ ... ] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub jobs: Vec<JobConfig>,
}

impl Batch {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        require_file_exists(path, "batch")?;
        Ok(serde_json::from_reader(File::open(path)?)?)
    }
}

/// Result of one batch job. A failed job never stops its siblings.
#[derive(Debug)]
pub struct JobOutcome {
    pub name: String,
    pub result: Result<LinkSummary>,
}

/// Run one job: read inputs, link, and write `matches.csv`, `recovered.csv`,
/// `unrecoverable.csv` and `summary.json` into the output directory.
pub fn run_job(job: &JobConfig, progress: &dyn Progress) -> Result<LinkSummary> {
    require_file_exists(&job.points, "points")?;
    require_file_exists(&job.polygons, "polygons")?;
    let layers = match (&job.zip_areas, &job.region_boundary) {
        (Some(zip_areas), Some(region_boundary)) => {
            require_file_exists(zip_areas, "zip areas")?;
            require_file_exists(region_boundary, "region boundary")?;
            Some((Layer::from_shapefile(zip_areas)?, Layer::from_shapefile(region_boundary)?))
        }
        (None, None) => None,
        _ => return Err(Error::Config(format!(
            "job {:?}: zip_areas and region_boundary must be given together", job.name
        ))),
    };

    let geocoded = read_table(&job.points)?;
    let polygons = Layer::from_shapefile(&job.polygons)?;
    let recovery = layers.as_ref().map(|(zip_areas, region_boundary)| Recovery {
        zip_areas,
        region_boundary,
        zip_fields: &job.zip_fields,
    });

    let result = link(&geocoded, &polygons, recovery, &job.overlay, progress)?;
    let summary = result.summary();

    ensure_dir_exists(&job.output)?;
    write_table(&mut result.overlay.to_dataframe()?, &job.output.join("matches.csv"))?;
    write_table(&mut result.recovery.to_dataframe()?, &job.output.join("recovered.csv"))?;
    write_table(&mut result.recovery.unrecoverable_dataframe()?, &job.output.join("unrecoverable.csv"))?;
    serde_json::to_writer_pretty(File::create(job.output.join("summary.json"))?, &summary)?;

    tracing::info!(job = %job.name, output = %job.output.display(), ?summary, "[batch] job finished");
    Ok(summary)
}

/// Run every job of `batch` in parallel, returning outcomes in job order.
pub fn run_batch(batch: &Batch) -> Vec<JobOutcome> {
    batch.jobs.par_iter()
        .map(|job| {
            let span = tracing::info_span!("job", name = %job.name);
            let _guard = span.enter();

            let result = run_job(job, &LogProgress::default());
            if let Err(e) = &result {
                tracing::error!(job = %job.name, error = %e, "[batch] job failed");
            }
            JobOutcome { name: job.name.clone(), result }
        })
        .collect()
}
