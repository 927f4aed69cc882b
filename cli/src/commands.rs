pub mod batch;
pub mod link;
pub mod overlay;
pub mod recover;

use std::path::Path;

use anyhow::{Context, Result};
use qor::Layer;

/// Load a polygon shapefile, naming it in any error.
pub(crate) fn load_layer(path: &Path, what: &str) -> Result<Layer> {
    tracing::info!("[load] reading {what} from {}", path.display());
    Layer::from_shapefile(path).with_context(|| format!("[load] failed to read {what} shapefile {}", path.display()))
}
