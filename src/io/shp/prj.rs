use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static AUTHORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"AUTHORITY\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#).expect("valid AUTHORITY pattern")
});

static UTM_ZONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"UTM_Zone_(\d+)([NS])").expect("valid UTM zone pattern")
});

static PROJCS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*PROJCS\[\s*"([^"]*)""#).expect("valid PROJCS pattern")
});

/// Detect the EPSG code described by a `.prj` (WKT1) file.
///
/// OGC-flavored WKT carries `AUTHORITY["EPSG","nnnn"]` tags; the outermost one
/// (last in the text) names the CRS itself. ESRI-flavored WKT has no tags, so
/// the common Census datums and projections are recognized by name.
///
/// An unrecognized geographic CRS gives `None`. An unrecognized projected CRS is
/// an error, since its coordinates are not degrees.
pub(crate) fn epsg_from_prj(wkt: &str) -> Result<Option<u32>> {
    if let Some(code) = AUTHORITY.captures_iter(wkt).last().and_then(|c| c[1].parse().ok()) {
        return Ok(Some(code));
    }

    let nad83 = wkt.contains("North_American_1983") || wkt.contains("NAD_1983") || wkt.contains("NAD83");
    let wgs84 = wkt.contains("WGS_1984") || wkt.contains("WGS 84") || wkt.contains("WGS84");

    if wkt.trim_start().starts_with("PROJCS") {
        let zone = UTM_ZONE.captures(wkt)
            .and_then(|caps| Some((caps[1].parse::<u32>().ok()?, &caps[2] == "N")));
        let code = match zone {
            Some((zone, true)) if nad83 => Some(26900 + zone),
            Some((zone, true)) if wgs84 => Some(32600 + zone),
            Some((zone, false)) if wgs84 => Some(32700 + zone),
            Some(_) => None,
            None if wkt.contains("Albers") && nad83 => Some(5070),
            None if wkt.contains("Web_Mercator") || wkt.contains("Pseudo-Mercator") => Some(3857),
            None => None,
        };
        return match code {
            Some(code) => Ok(Some(code)),
            None => {
                let name = PROJCS_NAME.captures(wkt).and_then(|caps| caps.get(1)).map_or("unnamed", |m| m.as_str());
                Err(Error::Projection(format!("unrecognized projected CRS \"{name}\"; reproject the layer or add an EPSG AUTHORITY tag")))
            }
        };
    }

    if nad83 { return Ok(Some(4269)) }
    if wgs84 { return Ok(Some(4326)) }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiger_prj_is_nad83() {
        let wkt = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["Degree",0.017453292519943295]]"#;
        assert_eq!(epsg_from_prj(wkt).unwrap(), Some(4269));
    }

    #[test]
    fn authority_tag_wins() {
        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4326"]]"#;
        assert_eq!(epsg_from_prj(wkt).unwrap(), Some(4326));
    }

    #[test]
    fn esri_utm_names() {
        let wkt = r#"PROJCS["NAD_1983_UTM_Zone_17N",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]]],PROJECTION["Transverse_Mercator"]]"#;
        assert_eq!(epsg_from_prj(wkt).unwrap(), Some(26917));
    }

    #[test]
    fn unknown_geographic_crs_is_none() {
        assert_eq!(epsg_from_prj(r#"GEOGCS["GCS_Unknown",DATUM["D_Unknown"]]"#).unwrap(), None);
    }

    #[test]
    fn unknown_projected_crs_is_an_error() {
        let wkt = r#"PROJCS["NAD_1983_StatePlane_North_Carolina_FIPS_3200_Feet",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]]],PROJECTION["Lambert_Conformal_Conic"],UNIT["Foot_US",0.3048006096012192]]"#;
        match epsg_from_prj(wkt) {
            Err(Error::Projection(msg)) => assert!(msg.contains("StatePlane_North_Carolina"), "{msg}"),
            other => panic!("expected Projection error, got {other:?}"),
        }
    }
}
