use std::path::PathBuf;

use qor::{Crs, LayerFields, PointFields, RegionFilter};

/// Assign geocoded records to administrative boundaries
#[derive(clap::Parser, Debug)]
#[command(name = "qor", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Assign located points to polygons
    Overlay(OverlayArgs),

    /// Place unlocated units by postal code
    Recover(RecoverArgs),

    /// Split a geocoder output table, then overlay and recover it
    Link(LinkArgs),

    /// Run independent link jobs from a JSON file in parallel
    Batch(BatchArgs),
}

/// Columns of the point table.
#[derive(clap::Args, Debug)]
pub struct PointArgs {
    /// Unique id column
    #[arg(long, default_value = "point_id")]
    pub id: String,

    /// Longitude / easting column
    #[arg(long, default_value = "lon")]
    pub x: String,

    /// Latitude / northing column
    #[arg(long, default_value = "lat")]
    pub y: String,

    /// EPSG code of the point coordinates
    #[arg(long, default_value_t = 4269)]
    pub epsg: u32,
}

impl PointArgs {
    pub fn fields(&self, zip: Option<String>) -> PointFields {
        PointFields { id: self.id.clone(), x: self.x.clone(), y: self.y.clone(), zip }
    }

    pub fn crs(&self) -> Crs { Crs::from_epsg(self.epsg) }
}

/// Optional restriction of the polygon layer to one region.
#[derive(clap::Args, Debug)]
pub struct RegionArgs {
    /// Polygon column holding region codes, e.g. STATEFP
    #[arg(long)]
    pub region_field: Option<String>,

    /// Region code to keep, e.g. 37
    #[arg(long, requires = "region_field")]
    pub region_value: Option<String>,
}

impl RegionArgs {
    pub fn filter(&self) -> RegionFilter {
        RegionFilter { field: self.region_field.clone(), value: self.region_value.clone() }
    }
}

#[derive(clap::Args, Debug)]
pub struct OverlayArgs {
    /// Point table (CSV, or Parquet by extension)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub points: PathBuf,

    /// Polygon shapefile
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub polygons: PathBuf,

    #[command(flatten)]
    pub point_fields: PointArgs,

    /// Polygon id column
    #[arg(long, default_value = "GEOID")]
    pub polygon_id: String,

    #[command(flatten)]
    pub region: RegionArgs,

    /// Output table, defaults to "./matches.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct RecoverArgs {
    /// Unlocated unit table (CSV, or Parquet by extension)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub units: PathBuf,

    /// Polygon shapefile
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub polygons: PathBuf,

    /// Zip-area (ZCTA) shapefile
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub zip_areas: PathBuf,

    /// Region boundary shapefile (e.g. the state outline)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub region_boundary: PathBuf,

    /// Unit id column
    #[arg(long, default_value = "unit_id")]
    pub unit_id: String,

    /// Unit postal code column
    #[arg(long, default_value = "zip")]
    pub zip: String,

    /// Polygon id column
    #[arg(long, default_value = "GEOID")]
    pub polygon_id: String,

    /// Zip-area id column
    #[arg(long, default_value = "ZCTA5CE20")]
    pub zip_id: String,

    #[command(flatten)]
    pub region: RegionArgs,

    /// Output directory, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Geocoder output table (CSV, or Parquet by extension)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub points: PathBuf,

    /// Polygon shapefile
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub polygons: PathBuf,

    #[command(flatten)]
    pub point_fields: PointArgs,

    /// Postal code column, needed for recovery
    #[arg(long)]
    pub zip: Option<String>,

    /// Polygon id column
    #[arg(long, default_value = "GEOID")]
    pub polygon_id: String,

    /// Zip-area (ZCTA) shapefile; enables recovery
    #[arg(long, requires_all = ["region_boundary", "zip"], value_hint = clap::ValueHint::FilePath)]
    pub zip_areas: Option<PathBuf>,

    /// Region boundary shapefile
    #[arg(long, requires = "zip_areas", value_hint = clap::ValueHint::FilePath)]
    pub region_boundary: Option<PathBuf>,

    /// Zip-area id column
    #[arg(long, default_value = "ZCTA5CE20")]
    pub zip_id: String,

    #[command(flatten)]
    pub region: RegionArgs,

    /// Output directory, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,
}

impl LinkArgs {
    pub fn zip_fields(&self) -> LayerFields { LayerFields::new(&self.zip_id) }
}

#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    /// JSON job file: { "jobs": [ ... ] }
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub jobs: PathBuf,

    /// Worker threads, defaults to one per core
    #[arg(short, long)]
    pub threads: Option<usize>,
}
