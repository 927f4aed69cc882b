use std::sync::Arc;

use ahash::AHashMap;
use geo::{
    line_intersection::{line_intersection, LineIntersection},
    orient::{Direction, Orient},
    unary_union, Area, BooleanOps, Coord, CoordsIter, LineString, MultiPolygon, Polygon, Validation,
};
use rstar::{primitives::{GeomWithData, Rectangle}, RTree, AABB};

use crate::{error::{Error, Result}, geom::Geometries};

/// Drop repeated vertices and close the ring; `None` if fewer than three vertices remain.
fn clean_ring(ring: &LineString<f64>) -> Option<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len() + 1);
    for &coord in &ring.0 {
        if coords.last() != Some(&coord) { coords.push(coord) }
    }
    if coords.len() > 1 && coords.first() == coords.last() { coords.pop(); }
    if coords.len() < 3 { return None }
    coords.push(coords[0]);
    Some(LineString::new(coords))
}

/// Insert every crossing and overlap point into the edges of a closed ring.
fn node_ring(ring: &LineString<f64>) -> Vec<Coord<f64>> {
    let lines = ring.lines().collect::<Vec<_>>();
    let Some(first) = lines.first() else { return Vec::new() };

    let tree: RTree<GeomWithData<Rectangle<[f64; 2]>, usize>> = RTree::bulk_load(lines.iter().enumerate()
        .map(|(i, line)| GeomWithData::new(Rectangle::from_corners(line.start.into(), line.end.into()), i))
        .collect());

    let mut splits: Vec<Vec<Coord<f64>>> = vec![Vec::new(); lines.len()];
    for (i, line) in lines.iter().enumerate() {
        let envelope: AABB<[f64; 2]> = AABB::from_corners(line.start.into(), line.end.into());
        for other in tree.locate_in_envelope_intersecting(&envelope) {
            let j = other.data;
            if j <= i { continue }
            let points = match line_intersection(*line, lines[j]) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => vec![intersection],
                Some(LineIntersection::Collinear { intersection }) => vec![intersection.start, intersection.end],
                None => continue,
            };
            for point in points {
                for k in [i, j] {
                    if point != lines[k].start && point != lines[k].end { splits[k].push(point) }
                }
            }
        }
    }

    let mut noded = Vec::with_capacity(lines.len() + 1);
    for (line, mut points) in lines.iter().zip(splits) {
        let from = line.start;
        points.sort_by(|a, b| (a.x - from.x).hypot(a.y - from.y).total_cmp(&(b.x - from.x).hypot(b.y - from.y)));
        points.dedup();
        noded.push(from);
        noded.extend(points);
    }
    noded.push(first.start);
    noded
}

/// Cut a noded ring into simple loops at every revisited vertex.
fn split_loops(noded: &[Coord<f64>]) -> Vec<LineString<f64>> {
    let key = |c: &Coord<f64>| ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits());

    let mut loops = Vec::new();
    let mut path: Vec<Coord<f64>> = Vec::with_capacity(noded.len());
    let mut seen: AHashMap<(u64, u64), usize> = AHashMap::with_capacity(noded.len());
    for &coord in noded {
        match seen.get(&key(&coord)) {
            Some(&start) => {
                let tail = path.split_off(start + 1);
                for c in &tail { seen.remove(&key(c)); }
                let mut ring = Vec::with_capacity(tail.len() + 2);
                ring.push(coord);
                ring.extend(tail);
                ring.push(coord);
                loops.push(LineString::new(ring));
            }
            None => {
                seen.insert(key(&coord), path.len());
                path.push(coord);
            }
        }
    }
    loops
}

/// Simple, counter-clockwise polygons covering the area a ring encloses.
fn ring_lobes(ring: &LineString<f64>) -> Vec<Polygon<f64>> {
    let Some(ring) = clean_ring(ring) else { return Vec::new() };
    split_loops(&node_ring(&ring)).into_iter()
        .map(|lobe| Polygon::new(lobe, vec![]))
        .filter(|lobe| lobe.unsigned_area() > 0.0)
        .map(|lobe| lobe.orient(Direction::Default))
        .collect()
}

/// Every part of a valid shape must enclose some area.
fn is_sound(shape: &MultiPolygon<f64>) -> bool {
    shape.is_valid() && shape.0.iter().all(|polygon| polygon.unsigned_area() > 0.0)
}

/// Repair a shape into a valid, non-empty MultiPolygon, or explain why it can't be.
///
/// Sound shapes are returned as-is, as are shapes that only needed repeated
/// vertices or unclosed rings fixed. Otherwise each ring is split at its
/// self-intersections into simple lobes, holes are cut out of their shell, and
/// all parts are merged with a union so overlapping parts keep their full area.
pub(crate) fn repair_shape(shape: &MultiPolygon<f64>) -> std::result::Result<MultiPolygon<f64>, String> {
    if shape.0.is_empty() { return Err("empty geometry".into()) }
    if shape.coords_iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err("non-finite coordinate".into());
    }
    if is_sound(shape) { return Ok(shape.clone()) }

    let cleaned = MultiPolygon::new(shape.0.iter()
        .filter_map(|polygon| {
            let exterior = clean_ring(polygon.exterior())?;
            Some(Polygon::new(exterior, polygon.interiors().iter().filter_map(clean_ring).collect()))
        })
        .collect());
    if !cleaned.0.is_empty() && is_sound(&cleaned) { return Ok(cleaned) }

    let parts = shape.0.iter()
        .filter_map(|polygon| {
            let shell = ring_lobes(polygon.exterior());
            if shell.is_empty() { return None }
            let shell = unary_union(&shell);
            let holes = polygon.interiors().iter().flat_map(ring_lobes).collect::<Vec<_>>();
            Some(if holes.is_empty() { shell } else { shell.difference(&unary_union(&holes)) })
        })
        .collect::<Vec<_>>();
    if parts.is_empty() { return Err("no ring encloses a positive area".into()) }

    let rebuilt = unary_union(&parts);
    if rebuilt.0.is_empty() || rebuilt.unsigned_area() <= 0.0 {
        return Err("repair produced an empty geometry".into());
    }
    if !rebuilt.is_valid() {
        return Err("geometry remains invalid after repair".into());
    }
    Ok(rebuilt)
}

impl Geometries {
    /// Repair every shape, naming the offending feature by `ids` on failure.
    pub(crate) fn repaired(&self, ids: &[Arc<str>], collection: &'static str) -> Result<Geometries> {
        let mut repairs = 0usize;
        let shapes = self.shapes().iter().zip(ids)
            .map(|(shape, id)| {
                let repaired = repair_shape(shape).map_err(|reason| Error::InvalidGeometry {
                    collection,
                    id: id.to_string(),
                    reason,
                })?;
                if &repaired != shape { repairs += 1 }
                Ok(repaired)
            })
            .collect::<Result<Vec<_>>>()?;

        if repairs > 0 {
            tracing::debug!(collection, repairs, "[geom::repair] repaired invalid geometries");
        }

        Ok(Geometries::new(shapes, self.crs()))
    }
}
