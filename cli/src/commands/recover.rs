use std::fs;

use anyhow::{Context, Result};
use qor::{read_table, recover, write_table, LayerFields, LogProgress, RecoverConfig, UnitFields};

use crate::{cli::{Cli, RecoverArgs}, commands::load_layer};

pub fn run(_cli: &Cli, args: &RecoverArgs) -> Result<()> {
    let out_dir = args.output.clone().unwrap_or_else(|| ".".into());

    tracing::info!("[recover] reading units from {}", args.units.display());
    let units = read_table(&args.units)
        .with_context(|| format!("[recover] failed to read units from {}", args.units.display()))?;
    let polygons = load_layer(&args.polygons, "polygons")?;
    let zip_areas = load_layer(&args.zip_areas, "zip areas")?;
    let region_boundary = load_layer(&args.region_boundary, "region boundary")?;

    let config = RecoverConfig {
        units: UnitFields { id: args.unit_id.clone(), zip: args.zip.clone() },
        polygons: LayerFields::new(&args.polygon_id),
        zip_areas: LayerFields::new(&args.zip_id),
        region: args.region.filter(),
    };
    let result = recover(&units, &polygons, &zip_areas, &region_boundary, &config, &LogProgress::default())?;

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("[recover] failed to create {}", out_dir.display()))?;
    tracing::info!(
        "[recover] writing {} recovered and {} unrecoverable units to {}",
        result.records.len(), result.unrecoverable.len(), out_dir.display(),
    );
    write_table(&mut result.to_dataframe()?, &out_dir.join("recovered.csv"))?;
    write_table(&mut result.unrecoverable_dataframe()?, &out_dir.join("unrecoverable.csv"))?;

    Ok(())
}
