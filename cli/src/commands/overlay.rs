use anyhow::{Context, Result};
use qor::{overlay, read_table, write_table, LayerFields, LogProgress, OverlayConfig};

use crate::{cli::{Cli, OverlayArgs}, commands::load_layer};

pub fn run(_cli: &Cli, args: &OverlayArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or_else(|| "./matches.csv".into());

    tracing::info!("[overlay] reading points from {}", args.points.display());
    let points = read_table(&args.points)
        .with_context(|| format!("[overlay] failed to read points from {}", args.points.display()))?;
    let polygons = load_layer(&args.polygons, "polygons")?;

    let config = OverlayConfig {
        points: args.point_fields.fields(None),
        polygons: LayerFields::new(&args.polygon_id),
        region: args.region.filter(),
        crs: args.point_fields.crs(),
    };
    let result = overlay(&points, &polygons, &config, &LogProgress::default())?;

    tracing::info!("[overlay] writing {} matches to {}", result.len(), out_path.display());
    write_table(&mut result.to_dataframe()?, &out_path)
        .with_context(|| format!("[overlay] failed to write {}", out_path.display()))?;

    Ok(())
}
