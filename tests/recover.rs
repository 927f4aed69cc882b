mod common;

use std::collections::BTreeSet;

use common::{layer, rect, units};
use qor::{recover, Crs, Error, Layer, RecoverConfig, RegionFilter};
use polars::prelude::{Column, DataFrame};

fn utm() -> Crs { Crs::from_epsg(26917) }

fn districts() -> Layer {
    let data = DataFrame::new(vec![
        Column::new("GEOID".into(), ["3701", "3702", "4501"]),
        Column::new("STATEFP".into(), ["37", "37", "45"]),
    ]).unwrap();
    Layer::new(data, vec![rect(0.0, 0.0, 100.0, 100.0), rect(100.0, 0.0, 200.0, 100.0), rect(200.0, 0.0, 300.0, 100.0)], utm()).unwrap()
}

fn zctas() -> Layer {
    layer(
        "ZCTA5CE20",
        &["27601", "27705", "02134", "29201"],
        vec![
            rect(10.0, 10.0, 30.0, 30.0),
            rect(150.0, 40.0, 170.0, 60.0),
            rect(60.0, 60.0, 80.0, 80.0),
            rect(250.0, 40.0, 270.0, 60.0),
        ],
        utm(),
    )
}

fn north_carolina() -> Layer {
    layer("STATEFP", &["37"], vec![rect(0.0, 0.0, 200.0, 100.0)], utm())
}

#[test]
fn every_unit_lands_in_exactly_one_output() {
    let ids = ["u1", "u2", "u3", "u4", "u5", "u6", "u7"];
    let df = units(&ids, &[
        Some("27601-1234"),
        Some("277051234"),
        Some("2134"),
        Some("29201"),
        Some("12345"),
        Some("  "),
        None,
    ]);
    let result = recover(&df, &districts(), &zctas(), &north_carolina(), &RecoverConfig::default(), &()).unwrap();

    let recovered = result.records.iter().map(|r| r.unit_id.as_ref()).collect::<BTreeSet<_>>();
    let lost = result.unrecoverable.iter().map(|r| r.unit_id.as_ref()).collect::<BTreeSet<_>>();
    assert!(recovered.is_disjoint(&lost));
    assert_eq!(recovered.union(&lost).copied().collect::<BTreeSet<_>>(), ids.into_iter().collect());

    assert_eq!(recovered, BTreeSet::from(["u1", "u2", "u3"]));
    // 29201 is a South Carolina zip outside the region boundary.
    assert_eq!(lost, BTreeSet::from(["u4", "u5", "u6", "u7"]));
}

#[test]
fn zip_plus_four_resolves_against_the_base_code() {
    let df = units(&["u1"], &[Some("27601-1234")]);
    let result = recover(&df, &districts(), &zctas(), &north_carolina(), &RecoverConfig::default(), &()).unwrap();

    let record = &result.records[0];
    assert_eq!(record.postal_code.as_ref(), "27601");
    assert_eq!(record.polygon_id.as_ref(), "3701");
    assert!(record.matched_by_zip);
    // Centroid (20, 20) to interior point (50, 50).
    assert!((record.distance - 30.0 * 2f64.sqrt()).abs() < 1e-9);
}

#[test]
fn unrecoverable_units_keep_the_code_as_provided() {
    let df = units(&["u1", "u2"], &[Some("12345-6789"), None]);
    let result = recover(&df, &districts(), &zctas(), &north_carolina(), &RecoverConfig::default(), &()).unwrap();
    assert!(result.records.is_empty());
    assert_eq!(result.unrecoverable[0].postal_code.as_deref(), Some("12345-6789"));
    assert_eq!(result.unrecoverable[1].postal_code, None);
}

#[test]
fn units_sharing_a_zip_share_a_polygon() {
    let df = units(&["a", "b", "c"], &[Some("27705"), Some("27705-0001"), Some("27705")]);
    let result = recover(&df, &districts(), &zctas(), &north_carolina(), &RecoverConfig::default(), &()).unwrap();
    assert_eq!(result.records.len(), 3);
    assert!(result.records.iter().all(|r| r.polygon_id.as_ref() == "3702"));
    assert!(result.records.windows(2).all(|w| w[0].distance == w[1].distance));
}

#[test]
fn region_filter_limits_the_polygon_set() {
    let df = units(&["u1"], &[Some("02134")]);
    let config = RecoverConfig { region: RegionFilter::new("STATEFP", "37"), ..RecoverConfig::default() };
    let result = recover(&df, &districts(), &zctas(), &north_carolina(), &config, &()).unwrap();
    assert_eq!(result.records[0].polygon_id.as_ref(), "3701");
}

#[test]
fn inconsistent_region_filters_fail() {
    let df = units(&["u1"], &[Some("27601")]);

    let value_only = RecoverConfig {
        region: RegionFilter { field: None, value: Some("37".into()) },
        ..RecoverConfig::default()
    };
    assert!(matches!(
        recover(&df, &districts(), &zctas(), &north_carolina(), &value_only, &()),
        Err(Error::Config(_))
    ));

    let no_match = RecoverConfig { region: RegionFilter::new("STATEFP", "06"), ..RecoverConfig::default() };
    assert!(matches!(
        recover(&df, &districts(), &zctas(), &north_carolina(), &no_match, &()),
        Err(Error::Config(_))
    ));

    // A field with no value only warns.
    let field_only = RecoverConfig {
        region: RegionFilter { field: Some("STATEFP".into()), value: None },
        ..RecoverConfig::default()
    };
    assert!(recover(&df, &districts(), &zctas(), &north_carolina(), &field_only, &()).is_ok());
}

#[test]
fn duplicate_unit_ids_fail() {
    let df = units(&["u1", "u1"], &[Some("27601"), Some("27705")]);
    assert!(matches!(
        recover(&df, &districts(), &zctas(), &north_carolina(), &RecoverConfig::default(), &()),
        Err(Error::DuplicateIdentifier { collection: "units", .. })
    ));
}

#[test]
fn empty_zip_layer_is_missing_input() {
    let df = units(&["u1"], &[Some("27601")]);
    let empty = layer("ZCTA5CE20", &[], vec![], utm());
    assert!(matches!(
        recover(&df, &districts(), &empty, &north_carolina(), &RecoverConfig::default(), &()),
        Err(Error::MissingInput(_))
    ));
}
