//! Field mappings and per-operation configuration.
//!
//! Column names are resolved once, at the interface boundary, from these
//! structs; nothing downstream re-derives them. Every struct deserializes
//! from JSON with defaults for absent keys, so batch job files only need to
//! name what differs from the Census defaults.

use serde::{Deserialize, Serialize};

use crate::{error::{Error, Result}, geom::Crs};

/// Columns of a geocoded point table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointFields {
    /// Unique identifier column, mapped to the canonical `point_id`.
    pub id: String,
    /// Longitude / easting column.
    pub x: String,
    /// Latitude / northing column.
    pub y: String,
    /// Postal code column, used only when unlocated rows are recovered.
    pub zip: Option<String>,
}

impl Default for PointFields {
    fn default() -> Self {
        Self { id: "point_id".into(), x: "lon".into(), y: "lat".into(), zip: None }
    }
}

/// Columns of an unlocated-unit table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitFields {
    pub id: String,
    pub zip: String,
}

impl Default for UnitFields {
    fn default() -> Self {
        Self { id: "unit_id".into(), zip: "zip".into() }
    }
}

/// Identifier column of a polygon layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerFields {
    pub id: String,
}

impl LayerFields {
    pub fn new(id: impl Into<String>) -> Self { Self { id: id.into() } }

    /// Defaults for 2020 ZCTA shapefiles.
    pub fn zcta() -> Self { Self::new("ZCTA5CE20") }
}

impl Default for LayerFields {
    fn default() -> Self { Self::new("GEOID") }
}

/// Optional pre-filter restricting a national polygon layer to one region
/// (e.g. `STATEFP == "37"`). Purely a performance measure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionFilter {
    /// Column holding region codes.
    pub field: Option<String>,
    /// Region code to keep.
    pub value: Option<String>,
}

impl RegionFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self { field: Some(field.into()), value: Some(value.into()) }
    }

    /// Resolve to a `(field, value)` pair, or None when no filtering applies.
    ///
    /// A value without a field is inconsistent and fails. A field without a
    /// value only means the cheaper path was available but unused, which is
    /// logged rather than treated as an error.
    pub(crate) fn resolve(&self) -> Result<Option<(&str, &str)>> {
        match (self.field.as_deref(), self.value.as_deref()) {
            (Some(field), Some(value)) => Ok(Some((field, value))),
            (None, Some(value)) => Err(Error::Config(format!(
                "region filter value {value:?} supplied without a region field"
            ))),
            (Some(field), None) => {
                tracing::warn!(field, "[config] region field set but no region value; matching against the full polygon layer");
                Ok(None)
            }
            (None, None) => Ok(None),
        }
    }
}

/// Configuration for `overlay`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub points: PointFields,
    pub polygons: LayerFields,
    pub region: RegionFilter,
    /// CRS of the point coordinates; the CRS of record for the whole overlay.
    pub crs: Crs,
}

/// Configuration for `recover`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoverConfig {
    pub units: UnitFields,
    pub polygons: LayerFields,
    pub zip_areas: LayerFields,
    pub region: RegionFilter,
}

impl Default for RecoverConfig {
    fn default() -> Self {
        Self {
            units: UnitFields::default(),
            polygons: LayerFields::default(),
            zip_areas: LayerFields::zcta(),
            region: RegionFilter::default(),
        }
    }
}
