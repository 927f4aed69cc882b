use std::sync::Arc;

use crate::{
    error::{Error, Result},
    overlay::{classify::{Bucket, Classification}, distance::{nearest, DistanceTable}},
};

/// Final polygon for one point: its index and, when resolved by distance, how far.
pub(crate) type Assignment = (usize, Option<f64>);

/// Assign every classified point to exactly one polygon.
///
/// `single` points keep their only hit. The rest are looked up in `table`,
/// whose row `r` belongs to point `unresolved[r]`: `multiple` points pick the
/// nearest among their hits, `none` points the nearest of all polygons.
pub(crate) fn assign(
    classification: &Classification,
    unresolved: &[usize],
    table: &DistanceTable,
    ids: &[Arc<str>],
) -> Result<Vec<Assignment>> {
    let (_, polygons) = table.shape();

    (0..classification.len())
        .map(|i| {
            let hits = classification.hits(i);
            let bucket = classification.bucket(i);
            if bucket == Bucket::Single { return Ok((hits[0] as usize, None)) }

            let r = unresolved.binary_search(&i)
                .map_err(|_| Error::MissingInput(format!("no distance row for point {i}")))?;
            let row = table.row(r);

            let best = match bucket {
                Bucket::Multiple => nearest(row, hits.iter().map(|&j| j as usize), ids),
                _ => nearest(row, 0..polygons, ids),
            };
            best.map(|(j, distance)| (j, Some(distance)))
                .ok_or_else(|| Error::MissingInput("no polygons to assign points to".into()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon, Point};

    use super::*;
    use crate::geom::{Crs, Geometries};

    fn rect(x0: f64, x1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: 0.0), (x: x1, y: 0.0), (x: x1, y: 2.0), (x: x0, y: 2.0), (x: x0, y: 0.0),
        ]])
    }

    #[test]
    fn assigns_each_bucket() {
        // Anchors at x = 1 and x = 5; the shared border sits at x = 2.
        let crs = Crs::from_epsg(26917);
        let geoms = Geometries::new(vec![rect(0.0, 2.0), rect(2.0, 8.0)], crs);
        let ids: Vec<Arc<str>> = vec!["A".into(), "B".into()];
        let anchors = vec![Point::new(1.0, 1.0), Point::new(5.0, 1.0)];

        let points = vec![Point::new(0.5, 1.0), Point::new(2.0, 1.0), Point::new(-3.0, 1.0)];
        let classification = Classification::new(&points, &geoms, &());
        let unresolved = classification.unresolved();
        assert_eq!(unresolved, vec![1, 2]);

        let rows = unresolved.iter().map(|&i| points[i]).collect::<Vec<_>>();
        let table = DistanceTable::compute(&rows, &anchors, crs, &()).unwrap();
        let assignments = assign(&classification, &unresolved, &table, &ids).unwrap();

        assert_eq!(assignments[0], (0, None));
        assert_eq!(assignments[1], (0, Some(1.0)));
        assert_eq!(assignments[2], (0, Some(4.0)));
    }
}
