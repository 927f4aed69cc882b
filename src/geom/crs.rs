use std::fmt;

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A coordinate reference system, identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs {
    epsg: u32,
}

impl Crs {
    /// NAD83 longitude/latitude, the TIGER/Line default.
    pub const NAD83: Crs = Crs { epsg: 4269 };

    /// WGS84 longitude/latitude, the usual geocoder output.
    pub const WGS84: Crs = Crs { epsg: 4326 };

    pub const fn from_epsg(epsg: u32) -> Self { Self { epsg } }

    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    /// True for longitude/latitude systems, whose native unit is degrees.
    #[inline]
    pub fn is_geographic(&self) -> bool {
        matches!(self.epsg, 4269 | 4326 | 4937 | 4979)
    }

    #[inline]
    fn is_nad83(&self) -> bool {
        matches!(self.epsg, 4269 | 4937 | 5070 | 26901..=26923)
    }

    /// Build the PROJ.4 definition for this CRS.
    pub(crate) fn proj4(&self) -> Result<String> {
        let proj = match self.epsg {
            4269 | 4937 => "+proj=longlat +datum=NAD83 +no_defs +type=crs".to_string(),
            4326 | 4979 => "+proj=longlat +datum=WGS84 +no_defs +type=crs".to_string(),
            3857 => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs".to_string(),
            5070 => "+proj=aea +lat_0=23 +lon_0=-96 +lat_1=29.5 +lat_2=45.5 +x_0=0 +y_0=0 +datum=NAD83 +units=m +no_defs +type=crs".to_string(),
            code @ 26901..=26923 => utm(code - 26900, true, "NAD83"),
            code @ 32601..=32660 => utm(code - 32600, true, "WGS84"),
            code @ 32701..=32760 => utm(code - 32700, false, "WGS84"),
            code => return Err(Error::Projection(format!("unsupported EPSG code {code}"))),
        };
        Ok(proj)
    }

    /// PROJ.4 string for the UTM zone containing `center` (lon/lat degrees), on this CRS's datum.
    /// - WGS84: 326zz (north) / 327zz (south)
    /// - NAD83: north only; if south, fall back to WGS84 UTM-S
    pub(crate) fn local_utm_proj4(&self, center: Coord<f64>) -> String {
        let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
        let north = center.y >= 0.0;

        // NAD83 UTM zones are northern only.
        let datum = if self.is_nad83() && north { "NAD83" } else { "WGS84" };
        utm(zone, north, datum)
    }
}

fn utm(zone: u32, north: bool, datum: &str) -> String {
    let south = if north { "" } else { " +south" };
    format!("+proj=utm +zone={zone}{south} +datum={datum} +units=m +no_defs +type=crs")
}

impl Default for Crs {
    fn default() -> Self { Crs::NAD83 }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}
