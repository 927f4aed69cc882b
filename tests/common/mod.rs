#![allow(dead_code)]

use std::path::Path;

use geo::{polygon, MultiPolygon};
use polars::prelude::{Column, DataFrame};
use qor::{Crs, Layer};
use shapefile::{
    dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
    Point, Polygon, PolygonRing, Writer,
};

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0),
    ]])
}

pub fn layer(column: &str, ids: &[&str], shapes: Vec<MultiPolygon<f64>>, crs: Crs) -> Layer {
    Layer::from_ids(column, ids, shapes, crs).unwrap()
}

pub fn points(ids: &[&str], xs: &[&str], ys: &[&str]) -> DataFrame {
    DataFrame::new(vec![
        Column::new("point_id".into(), ids),
        Column::new("x".into(), xs),
        Column::new("y".into(), ys),
    ]).unwrap()
}

pub fn units(ids: &[&str], zips: &[Option<&str>]) -> DataFrame {
    DataFrame::new(vec![
        Column::new("unit_id".into(), ids),
        Column::new("zip".into(), zips),
    ]).unwrap()
}

/// Write axis-aligned rectangles `(x0, y0, x1, y1)` as a polygon shapefile
/// with a single character id column. No `.prj` is written.
pub fn write_rects(path: &Path, column: &str, ids: &[&str], rects: &[(f64, f64, f64, f64)]) {
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from(column).unwrap(), 20);
    let mut writer = Writer::from_path(path, table).unwrap();

    for (id, &(x0, y0, x1, y1)) in ids.iter().zip(rects) {
        // Clockwise exterior ring.
        let ring = vec![
            Point::new(x0, y0), Point::new(x0, y1), Point::new(x1, y1), Point::new(x1, y0), Point::new(x0, y0),
        ];
        let mut record = Record::default();
        record.insert(column.to_string(), FieldValue::Character(Some(id.to_string())));
        writer.write_shape_and_record(&Polygon::new(PolygonRing::Outer(ring)), &record).unwrap();
    }
}
