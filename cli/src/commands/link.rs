use anyhow::{Context, Result};
use qor::{run_job, JobConfig, LayerFields, LogProgress, OverlayConfig};

use crate::cli::{Cli, LinkArgs};

pub fn run(_cli: &Cli, args: &LinkArgs) -> Result<()> {
    let job = JobConfig {
        name: args.points.display().to_string(),
        points: args.points.clone(),
        polygons: args.polygons.clone(),
        zip_areas: args.zip_areas.clone(),
        region_boundary: args.region_boundary.clone(),
        zip_fields: args.zip_fields(),
        overlay: OverlayConfig {
            points: args.point_fields.fields(args.zip.clone()),
            polygons: LayerFields::new(&args.polygon_id),
            region: args.region.filter(),
            crs: args.point_fields.crs(),
        },
        output: args.output.clone().unwrap_or_else(|| ".".into()),
    };

    let summary = run_job(&job, &LogProgress::default())
        .with_context(|| format!("[link] failed to link {}", args.points.display()))?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
