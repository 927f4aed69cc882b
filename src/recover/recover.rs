use std::{collections::BTreeMap, sync::Arc};

use ahash::AHashMap;
use geo::Point;
use polars::prelude::{Column, DataFrame};

use crate::{
    common::ensure_unique,
    config::{RecoverConfig, RegionFilter},
    error::{Error, Result},
    geom::Crs,
    layer::Layer,
    overlay::{nearest, DistanceTable},
    points::Units,
    progress::{Progress, Stage},
    recover::normalize_zip,
};

/// A unit placed by its postal code.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryRecord {
    pub unit_id: Arc<str>,
    pub polygon_id: Arc<str>,
    /// Normalized code that matched a zip area.
    pub postal_code: Arc<str>,
    /// Distance from the zip area's centroid to the polygon's interior point.
    pub distance: f64,
    pub matched_by_zip: bool,
}

/// A unit whose postal code is blank or names no zip area in the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unrecoverable {
    pub unit_id: Arc<str>,
    /// Code exactly as provided.
    pub postal_code: Option<String>,
}

/// Recover output. Every input unit appears in exactly one of the two lists,
/// each kept in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoverResult {
    pub records: Vec<RecoveryRecord>,
    pub unrecoverable: Vec<Unrecoverable>,
}

impl RecoverResult {
    /// Columns: `unit_id`, `polygon_id`, `postal_code`, `distance`, `matched_by_zip`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let records = &self.records;
        Ok(DataFrame::new(vec![
            Column::new("unit_id".into(), records.iter().map(|r| r.unit_id.as_ref()).collect::<Vec<_>>()),
            Column::new("polygon_id".into(), records.iter().map(|r| r.polygon_id.as_ref()).collect::<Vec<_>>()),
            Column::new("postal_code".into(), records.iter().map(|r| r.postal_code.as_ref()).collect::<Vec<_>>()),
            Column::new("distance".into(), records.iter().map(|r| r.distance).collect::<Vec<_>>()),
            Column::new("matched_by_zip".into(), records.iter().map(|r| r.matched_by_zip).collect::<Vec<_>>()),
        ])?)
    }

    /// Columns: `unit_id`, `postal_code` (null when none was provided).
    pub fn unrecoverable_dataframe(&self) -> Result<DataFrame> {
        let rows = &self.unrecoverable;
        Ok(DataFrame::new(vec![
            Column::new("unit_id".into(), rows.iter().map(|r| r.unit_id.as_ref()).collect::<Vec<_>>()),
            Column::new("postal_code".into(), rows.iter().map(|r| r.postal_code.as_deref()).collect::<Vec<_>>()),
        ])?)
    }
}

/// Place unlocated units by postal code.
///
/// Each unit's code is normalized and looked up among the zip areas that
/// overlap `region_boundary`. A found code assigns the polygon whose interior
/// point is nearest the zip area's centroid (ties to the lowest polygon id);
/// a blank or unknown code sends the unit to the unrecoverable set.
///
/// The polygons' CRS is the CRS of record: zip areas and the region boundary
/// are reprojected into it.
pub fn recover(
    units: &DataFrame,
    polygons: &Layer,
    zip_areas: &Layer,
    region_boundary: &Layer,
    config: &RecoverConfig,
    progress: &dyn Progress,
) -> Result<RecoverResult> {
    let units = Units::from_dataframe(units, &config.units)?;
    recover_units(&units, polygons, zip_areas, region_boundary, config, progress)
}

/// [`recover`] for units that have already been read into [`Units`].
pub fn recover_units(
    units: &Units,
    polygons: &Layer,
    zip_areas: &Layer,
    region_boundary: &Layer,
    config: &RecoverConfig,
    progress: &dyn Progress,
) -> Result<RecoverResult> {
    // Validate every input before touching geometry.
    let (polygons, polygon_ids) = polygons.resolve(&config.polygons, &config.region, "polygons")?;
    let (zip_areas, zip_ids) = zip_areas.resolve(&config.zip_areas, &RegionFilter::default(), "zip_areas")?;
    let zip_codes = zip_ids.iter()
        .map(|id| normalize_zip(id).map(Arc::<str>::from).unwrap_or_else(|| id.clone()))
        .collect::<Vec<_>>();
    ensure_unique(&zip_codes, &config.zip_areas.id, "zip_areas")?;
    if region_boundary.is_empty() {
        return Err(Error::MissingInput("region boundary layer has no features".into()));
    }

    let crs = polygons.crs();
    let geoms = polygons.prepared_geoms(&polygon_ids, crs, "polygons")?;
    let anchors = geoms.interior_points(&polygon_ids, "polygons")?;

    let centroids = zip_centroids(&zip_areas, &zip_ids, &zip_codes, region_boundary, crs)?;

    // One distance row per distinct requested code, not per unit.
    let codes = units.zips().iter()
        .map(|zip| zip.as_deref().and_then(normalize_zip))
        .collect::<Vec<_>>();
    let requested = codes.iter().flatten()
        .filter_map(|code| centroids.get_key_value(code.as_str()))
        .map(|(code, centroid)| (code.clone(), *centroid))
        .collect::<BTreeMap<Arc<str>, Point<f64>>>();

    let matches = {
        let rows = requested.values().copied().collect::<Vec<_>>();
        let table = DistanceTable::compute(&rows, &anchors, crs, progress)?;
        requested.keys().enumerate()
            .map(|(r, code)| {
                nearest(table.row(r), 0..polygon_ids.len(), &polygon_ids)
                    .map(|best| (code.clone(), best))
                    .ok_or_else(|| Error::MissingInput("no polygons to assign units to".into()))
            })
            .collect::<Result<AHashMap<Arc<str>, (usize, f64)>>>()?
    };

    let total = units.len();
    let mut result = RecoverResult::default();
    for (i, (unit_id, code)) in units.ids().iter().zip(&codes).enumerate() {
        match code.as_deref().and_then(|code| matches.get_key_value(code)) {
            Some((postal_code, &(j, distance))) => result.records.push(RecoveryRecord {
                unit_id: unit_id.clone(),
                polygon_id: polygon_ids[j].clone(),
                postal_code: postal_code.clone(),
                distance,
                matched_by_zip: true,
            }),
            None => result.unrecoverable.push(Unrecoverable {
                unit_id: unit_id.clone(),
                postal_code: units.zips()[i].clone(),
            }),
        }
        progress.report(Stage::Recover, i + 1, total);
    }

    tracing::info!(
        units = total,
        recovered = result.records.len(),
        unrecoverable = result.unrecoverable.len(),
        codes = matches.len(),
        "[recover] placed units by postal code",
    );
    Ok(result)
}

/// Centroids of the zip areas overlapping the region, keyed by normalized code,
/// in the CRS `crs`.
fn zip_centroids(
    zip_areas: &Layer,
    zip_ids: &[Arc<str>],
    zip_codes: &[Arc<str>],
    region_boundary: &Layer,
    crs: Crs,
) -> Result<AHashMap<Arc<str>, Point<f64>>> {
    let zips = zip_areas.prepared_geoms(zip_ids, crs, "zip_areas")?;

    let boundary_ids = (0..region_boundary.len())
        .map(|i| Arc::<str>::from(i.to_string()))
        .collect::<Vec<_>>();
    let boundary = region_boundary.prepared_geoms(&boundary_ids, crs, "region_boundary")?.union();

    let inside = zips.overlapping(&boundary);
    tracing::debug!(kept = inside.len(), total = zips.len(), "[recover] zip areas within region");

    let centroids = zips.centroids();
    inside.into_iter()
        .map(|i| {
            let centroid = centroids[i].ok_or_else(|| Error::InvalidGeometry {
                collection: "zip_areas",
                id: zip_ids[i].to_string(),
                reason: "shape has no centroid".into(),
            })?;
            Ok((zip_codes[i].clone(), centroid))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};

    use super::*;
    use crate::config::{LayerFields, UnitFields};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0),
        ]])
    }

    fn crs() -> Crs { Crs::from_epsg(26917) }

    fn districts() -> Layer {
        Layer::from_ids("GEOID", &["D1", "D2"], vec![rect(0.0, 0.0, 10.0, 10.0), rect(10.0, 0.0, 20.0, 10.0)], crs()).unwrap()
    }

    fn zctas() -> Layer {
        Layer::from_ids(
            "ZCTA5CE20",
            &["27601", "02134", "99999"],
            vec![rect(1.0, 1.0, 3.0, 3.0), rect(16.0, 4.0, 18.0, 6.0), rect(50.0, 50.0, 52.0, 52.0)],
            crs(),
        ).unwrap()
    }

    fn state() -> Layer {
        Layer::from_ids("STATEFP", &["37"], vec![rect(-1.0, -1.0, 21.0, 11.0)], crs()).unwrap()
    }

    fn units(ids: &[&str], zips: &[Option<&str>]) -> DataFrame {
        DataFrame::new(vec![
            Column::new("unit_id".into(), ids),
            Column::new("zip".into(), zips),
        ]).unwrap()
    }

    #[test]
    fn units_land_in_exactly_one_set() {
        let df = units(
            &["u1", "u2", "u3", "u4", "u5"],
            &[Some("27601-1234"), Some("2134"), Some("99999"), None, Some("00000")],
        );
        let result = recover(&df, &districts(), &zctas(), &state(), &RecoverConfig::default(), &()).unwrap();

        let recovered = result.records.iter().map(|r| (r.unit_id.as_ref(), r.polygon_id.as_ref())).collect::<Vec<_>>();
        assert_eq!(recovered, vec![("u1", "D1"), ("u2", "D2")]);
        assert!(result.records.iter().all(|r| r.matched_by_zip));
        assert_eq!(result.records[0].postal_code.as_ref(), "27601");

        // 99999 lies outside the region boundary, so it can't be matched.
        let lost = result.unrecoverable.iter().map(|r| r.unit_id.as_ref()).collect::<Vec<_>>();
        assert_eq!(lost, vec!["u3", "u4", "u5"]);
        assert_eq!(result.unrecoverable[0].postal_code.as_deref(), Some("99999"));
        assert_eq!(result.unrecoverable[1].postal_code, None);
    }

    #[test]
    fn distance_runs_from_zip_centroid_to_interior_point() {
        let df = units(&["u1"], &[Some("27601")]);
        let result = recover(&df, &districts(), &zctas(), &state(), &RecoverConfig::default(), &()).unwrap();
        // Centroid (2, 2) to D1's interior point (5, 5).
        assert!((result.records[0].distance - 18f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn duplicate_zip_codes_after_normalization_fail() {
        let zips = Layer::from_ids("ZCTA5CE20", &["2134", "02134"], vec![rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0)], crs()).unwrap();
        let df = units(&["u1"], &[Some("02134")]);
        let result = recover(&df, &districts(), &zips, &state(), &RecoverConfig::default(), &());
        assert!(matches!(result, Err(Error::DuplicateIdentifier { collection: "zip_areas", .. })));
    }

    #[test]
    fn missing_unit_zip_column_fails() {
        let df = units(&["u1"], &[Some("27601")]);
        let config = RecoverConfig { units: UnitFields { id: "unit_id".into(), zip: "postcode".into() }, ..RecoverConfig::default() };
        let result = recover(&df, &districts(), &zctas(), &state(), &config, &());
        assert!(matches!(result, Err(Error::MissingColumn { collection: "units", .. })));
    }

    #[test]
    fn missing_zip_id_column_fails() {
        let df = units(&["u1"], &[Some("27601")]);
        let config = RecoverConfig { zip_areas: LayerFields::new("ZCTA5CE10"), ..RecoverConfig::default() };
        let result = recover(&df, &districts(), &zctas(), &state(), &config, &());
        assert!(matches!(result, Err(Error::MissingColumn { collection: "zip_areas", .. })));
    }

    #[test]
    fn empty_region_boundary_is_missing_input() {
        let empty = Layer::from_ids("STATEFP", &[], vec![], crs()).unwrap();
        let df = units(&["u1"], &[Some("27601")]);
        let result = recover(&df, &districts(), &zctas(), &empty, &RecoverConfig::default(), &());
        assert!(matches!(result, Err(Error::MissingInput(_))));
    }

    #[test]
    fn exports_both_tables() {
        let df = units(&["u1", "u2"], &[Some("27601"), Some("")]);
        let result = recover(&df, &districts(), &zctas(), &state(), &RecoverConfig::default(), &()).unwrap();
        assert_eq!(result.to_dataframe().unwrap().height(), 1);
        let lost = result.unrecoverable_dataframe().unwrap();
        assert_eq!(lost.height(), 1);
        assert_eq!(lost.get_column_names_str(), vec!["unit_id", "postal_code"]);
    }
}
