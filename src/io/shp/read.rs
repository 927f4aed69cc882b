//! Shapefile reading operations.

use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use polars::prelude::{Column, DataFrame};
use shapefile::{dbase::{FieldValue, Record}, Reader, Shape};

use crate::{error::{Error, Result}, io::shp::epsg_from_prj};

/// Contents of a polygon shapefile: shapes, attribute table, and EPSG code if the `.prj` names one.
pub(crate) struct ShapefileContents {
    pub(crate) shapes: Vec<MultiPolygon<f64>>,
    pub(crate) data: DataFrame,
    pub(crate) epsg: Option<u32>,
}

/// Reads all shapes + attribute records from a given `.shp` file path.
pub(crate) fn read_shapefile(path: &Path) -> Result<ShapefileContents> {
    let mut reader = Reader::from_path(path)?;

    let mut shapes = Vec::with_capacity(reader.shape_count()?);
    let mut records = Vec::with_capacity(shapes.capacity());
    for (row, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result?;
        shapes.push(shape_to_multipolygon(shape, row, path)?);
        records.push(record);
    }

    let prj = path.with_extension("prj");
    let epsg = match std::fs::read_to_string(&prj) {
        Ok(text) => epsg_from_prj(&text)?,
        Err(_) => None,
    };

    Ok(ShapefileContents { shapes, data: records_to_dataframe(&records)?, epsg })
}

/// Coerce a generic shape into an owned multipolygon, raising error if different shape.
fn shape_to_multipolygon(shape: Shape, row: usize, path: &Path) -> Result<MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(polygon) => Ok(shp_to_geo(&polygon)),
        Shape::NullShape => Ok(MultiPolygon::new(Vec::new())),
        other => Err(Error::MissingInput(format!(
            "found non-Polygon shape {:?} at row {row} in {}", other.shapetype(), path.display()
        ))),
    }
}

/// Convert shapefile::Polygon to geo::MultiPolygon<f64>.
/// Exterior rings are clockwise in shapefiles, holes counter-clockwise; each
/// exterior is followed by its holes.
pub(crate) fn shp_to_geo(polygon: &shapefile::Polygon) -> MultiPolygon<f64> {
    /// Get the signed area of a geo::Coord list (negative for clockwise)
    fn signed_area(pts: &[Coord<f64>]) -> f64 {
        pts.windows(2).map(|w| w[0].x * w[1].y - w[1].x * w[0].y).sum::<f64>() / 2.0
    }

    let mut polygons = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes = Vec::new();

    for ring in polygon.rings() {
        let mut coords = ring.points().iter()
            .map(|pt| Coord { x: pt.x, y: pt.y })
            .collect::<Vec<_>>();
        if coords.first() != coords.last() {
            if let Some(&first) = coords.first() { coords.push(first) }
        }

        let is_exterior = signed_area(&coords) < 0.0;
        let ring = LineString::new(coords);
        if is_exterior {
            // flush previous polygon
            if let Some(ext) = exterior.replace(ring) {
                polygons.push(Polygon::new(ext, std::mem::take(&mut holes)));
            }
        } else {
            holes.push(ring);
        }
    }
    if let Some(ext) = exterior {
        polygons.push(Polygon::new(ext, holes));
    }

    MultiPolygon::new(polygons)
}

/// Render a dBase field value as text; None for nulls.
fn field_to_string(value: &FieldValue) -> Option<String> {
    /// Integral numbers print without a trailing ".0" so numeric codes stay joinable.
    fn number(n: f64) -> String {
        if n.fract() == 0.0 && n.abs() < 1e15 { format!("{}", n as i64) } else { n.to_string() }
    }

    match value {
        FieldValue::Character(s) => s.as_ref().map(|s| s.trim().to_string()),
        FieldValue::Numeric(n) => n.map(number),
        FieldValue::Float(f) => f.map(|f| number(f as f64)),
        FieldValue::Integer(i) => Some(i.to_string()),
        FieldValue::Double(d) => Some(number(*d)),
        FieldValue::Logical(b) => b.map(|b| b.to_string()),
        FieldValue::Memo(s) => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Convert attribute records to a DataFrame with one String column per field, sorted by name.
fn records_to_dataframe(records: &[Record]) -> Result<DataFrame> {
    let mut fields = records.first()
        .map(|record| record.clone().into_iter().map(|(name, _)| name).collect::<Vec<_>>())
        .unwrap_or_default();
    fields.sort();

    let columns = fields.iter()
        .map(|field| Column::new(
            field.as_str().into(),
            records.iter()
                .map(|record| record.get(field).and_then(field_to_string))
                .collect::<Vec<_>>(),
        ))
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use shapefile::{Point, PolygonRing};

    #[test]
    fn exterior_and_hole_are_grouped() {
        // Exterior clockwise, hole counter-clockwise (shapefile convention).
        let polygon = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(vec![
                Point::new(0.0, 0.0), Point::new(0.0, 4.0), Point::new(4.0, 4.0),
                Point::new(4.0, 0.0), Point::new(0.0, 0.0),
            ]),
            PolygonRing::Inner(vec![
                Point::new(1.0, 1.0), Point::new(2.0, 1.0), Point::new(2.0, 2.0),
                Point::new(1.0, 2.0), Point::new(1.0, 1.0),
            ]),
        ]);

        let shape = shp_to_geo(&polygon);
        assert_eq!(shape.0.len(), 1);
        assert_eq!(shape.0[0].interiors().len(), 1);
        assert_eq!(shape.unsigned_area(), 15.0);
    }

    #[test]
    fn numeric_fields_print_without_fraction() {
        assert_eq!(field_to_string(&FieldValue::Numeric(Some(37.0))), Some("37".into()));
        assert_eq!(field_to_string(&FieldValue::Numeric(Some(2.5))), Some("2.5".into()));
        assert_eq!(field_to_string(&FieldValue::Character(Some(" 27601 ".into()))), Some("27601".into()));
        assert_eq!(field_to_string(&FieldValue::Character(None)), None);
    }
}
