use std::sync::Arc;

use geo::Point;
use ndarray::{Array2, ArrayView1};

use crate::{
    error::Result,
    geom::{planar_distance, to_planar, Crs},
    progress::{Progress, Stage},
};

/// Dense point-to-anchor distance matrix (rows: points, columns: polygon anchors).
///
/// Values are in the units of `crs` when it is projected, and in meters
/// (via the local UTM zone) when it is geographic.
#[derive(Debug, Clone)]
pub(crate) struct DistanceTable {
    values: Array2<f64>,
}

impl DistanceTable {
    pub(crate) fn compute(rows: &[Point<f64>], cols: &[Point<f64>], crs: Crs, progress: &dyn Progress) -> Result<Self> {
        let (rows, cols) = to_planar(rows, cols, crs)?;
        let total = rows.len();

        let mut values = Array2::<f64>::zeros((rows.len(), cols.len()));
        for (i, (mut out, row)) in values.rows_mut().into_iter().zip(&rows).enumerate() {
            out.iter_mut().zip(&cols).for_each(|(value, col)| *value = planar_distance(row, col));
            progress.report(Stage::Resolve, i + 1, total);
        }

        Ok(Self { values })
    }

    #[inline] pub(crate) fn shape(&self) -> (usize, usize) { self.values.dim() }

    #[inline] pub(crate) fn row(&self, i: usize) -> ArrayView1<'_, f64> { self.values.row(i) }
}

/// Arg-min of `row` over `candidates` (column indices).
/// Equal distances go to the lexicographically lowest id.
pub(crate) fn nearest(
    row: ArrayView1<'_, f64>,
    candidates: impl IntoIterator<Item = usize>,
    ids: &[Arc<str>],
) -> Option<(usize, f64)> {
    candidates.into_iter()
        .map(|j| (j, row[j]))
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| ids[a.0].cmp(&ids[b.0])))
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn ids(names: &[&str]) -> Vec<Arc<str>> {
        names.iter().map(|&s| Arc::from(s)).collect()
    }

    #[test]
    fn table_holds_euclidean_distances() {
        let rows = vec![Point::new(0.0, 0.0), Point::new(3.0, 0.0)];
        let cols = vec![Point::new(0.0, 4.0), Point::new(3.0, 4.0), Point::new(6.0, 0.0)];
        let table = DistanceTable::compute(&rows, &cols, Crs::from_epsg(5070), &()).unwrap();

        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.row(0).to_vec(), vec![4.0, 5.0, 6.0]);
        assert_eq!(table.row(1).to_vec(), vec![5.0, 4.0, 3.0]);
    }

    #[test]
    fn empty_rows_give_an_empty_table() {
        let cols = vec![Point::new(0.0, 4.0)];
        let table = DistanceTable::compute(&[], &cols, Crs::from_epsg(5070), &()).unwrap();
        assert_eq!(table.shape().0, 0);
    }

    #[test]
    fn nearest_takes_the_minimum() {
        let row = array![7.0, 2.5, 9.0];
        assert_eq!(nearest(row.view(), 0..3, &ids(&["a", "b", "c"])), Some((1, 2.5)));
        assert_eq!(nearest(row.view(), [0, 2], &ids(&["a", "b", "c"])), Some((0, 7.0)));
    }

    #[test]
    fn ties_go_to_the_lowest_id() {
        let row = array![1.0, 1.0, 1.0];
        // Column order must not matter, only the ids.
        assert_eq!(nearest(row.view(), 0..3, &ids(&["m", "b", "z"])), Some((1, 1.0)));
        assert_eq!(nearest(row.view(), [2, 0], &ids(&["m", "b", "z"])), Some((0, 1.0)));
    }

    #[test]
    fn no_candidates_no_answer() {
        let row = array![1.0];
        assert_eq!(nearest(row.view(), [], &ids(&["a"])), None);
    }
}
