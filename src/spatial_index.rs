use ndarray::{Array2, Zip};
use num_traits::Float;

use crate::catalog::FeatureId;
use crate::error::{ColocationError, Result};
use crate::object::SpatialObject;

/// Forward half of the 8-neighborhood. Sweeping only these offsets visits
/// every adjacent cell pair exactly once.
const HALF_NEIGHBORHOOD: [(isize, isize); 4] = [(1, -1), (1, 0), (1, 1), (0, 1)];

/// Grid-partitioned neighbor search: cells of side `d` guarantee that any
/// two objects within distance `d` share a cell or sit in adjacent cells.
pub struct SpatialIndex<F> {
    distance: F,
}

impl<F> SpatialIndex<F>
where
    F: Float + Send + Sync,
{
    pub fn new(distance: F) -> Result<Self> {
        if !(distance > F::zero()) {
            return Err(ColocationError::InvalidDistance(
                distance.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(Self { distance })
    }

    /// Every unordered pair of objects of distinct feature types within
    /// Euclidean distance `d`, each emitted exactly once, as indices into
    /// `objects`. Emission order follows cell order; callers must not rely
    /// on it beyond determinism.
    pub fn neighbor_pairs(
        &self,
        objects: &[SpatialObject<F>],
        kinds: &[FeatureId],
    ) -> Vec<(usize, usize)> {
        if objects.is_empty() {
            return Vec::new();
        }

        let mut min_x = objects[0].x;
        let mut min_y = objects[0].y;
        let mut max_x = objects[0].x;
        let mut max_y = objects[0].y;
        for object in objects.iter().skip(1) {
            min_x = min_x.min(object.x);
            min_y = min_y.min(object.y);
            max_x = max_x.max(object.x);
            max_y = max_y.max(object.y);
        }

        // Cell side is d, widened when a tiny d would shatter the extent
        // into more cells than the objects justify; adjacency stays valid
        // because cells never shrink below d.
        let per_axis_cap = F::from(((objects.len() as f64).sqrt().ceil() as usize * 2).max(1))
            .unwrap();
        let side_x = self.distance.max((max_x - min_x) / per_axis_cap);
        let side_y = self.distance.max((max_y - min_y) / per_axis_cap);

        // Degenerate extents still get one cell; objects on the max
        // boundary clamp into the last cell.
        let cells_x = ((max_x - min_x) / side_x)
            .ceil()
            .to_usize()
            .unwrap_or(0)
            .max(1);
        let cells_y = ((max_y - min_y) / side_y)
            .ceil()
            .to_usize()
            .unwrap_or(0)
            .max(1);

        let mut cells: Array2<Vec<usize>> = Array2::from_elem((cells_x, cells_y), Vec::new());
        for (index, object) in objects.iter().enumerate() {
            let cx = ((object.x - min_x) / side_x)
                .floor()
                .to_usize()
                .unwrap_or(0)
                .min(cells_x - 1);
            let cy = ((object.y - min_y) / side_y)
                .floor()
                .to_usize()
                .unwrap_or(0)
                .min(cells_y - 1);
            cells[(cx, cy)].push(index);
        }

        let found: Array2<Vec<(usize, usize)>> =
            Zip::indexed(&cells).par_map_collect(|(cx, cy), cell| {
                let mut pairs = Vec::new();
                // Pairs within the cell
                for (i, &a) in cell.iter().enumerate() {
                    for &b in cell[i + 1..].iter() {
                        if kinds[a] != kinds[b] && self.within(&objects[a], &objects[b]) {
                            pairs.push((a, b));
                        }
                    }
                }
                // Pairs against the forward half of the neighborhood
                for &(dx, dy) in HALF_NEIGHBORHOOD.iter() {
                    let nx = cx as isize + dx;
                    let ny = cy as isize + dy;
                    if nx < 0 || ny < 0 || nx >= cells_x as isize || ny >= cells_y as isize {
                        continue;
                    }
                    let other = &cells[(nx as usize, ny as usize)];
                    for &a in cell.iter() {
                        for &b in other.iter() {
                            if kinds[a] != kinds[b] && self.within(&objects[a], &objects[b]) {
                                pairs.push((a, b));
                            }
                        }
                    }
                }
                pairs
            });

        found.into_iter().flatten().collect()
    }

    fn within(&self, a: &SpatialObject<F>, b: &SpatialObject<F>) -> bool {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        dx.powi(2) + dy.powi(2) <= self.distance.powi(2)
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use crate::catalog::FeatureCatalog;
    use crate::error::ColocationError;
    use crate::object::SpatialObject;
    use crate::spatial_index::SpatialIndex;

    fn obj(id: &str, kind: &str, x: f64, y: f64) -> SpatialObject<f64> {
        SpatialObject::new(id, kind, x, y)
    }

    fn pair_set(
        index: &SpatialIndex<f64>,
        objects: &[SpatialObject<f64>],
    ) -> HashSet<(usize, usize)> {
        let catalog = FeatureCatalog::from_objects(objects).unwrap();
        index
            .neighbor_pairs(objects, catalog.assignments())
            .into_iter()
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect()
    }

    fn brute_force(objects: &[SpatialObject<f64>], d: f64) -> HashSet<(usize, usize)> {
        let mut pairs = HashSet::new();
        for i in 0..objects.len() {
            for j in (i + 1)..objects.len() {
                let dx = objects[i].x - objects[j].x;
                let dy = objects[i].y - objects[j].y;
                if objects[i].kind != objects[j].kind && (dx * dx + dy * dy).sqrt() <= d {
                    pairs.insert((i, j));
                }
            }
        }
        pairs
    }

    #[test]
    fn invalid_distance() {
        assert!(matches!(
            SpatialIndex::<f64>::new(0.),
            Err(ColocationError::InvalidDistance(_))
        ));
        assert!(matches!(
            SpatialIndex::<f64>::new(-1.),
            Err(ColocationError::InvalidDistance(_))
        ));
    }

    #[test]
    fn empty_input_empty_output() {
        let index = SpatialIndex::new(2.).unwrap();
        assert!(index.neighbor_pairs(&[], &[]).is_empty());
    }

    #[test]
    fn matches_brute_force() {
        let objects = vec![
            obj("A1", "A", 0., 0.),
            obj("A2", "A", 10., 10.),
            obj("B1", "B", 1., 0.),
            obj("B2", "B", 10., 11.),
            obj("C1", "C", 2., 0.),
            obj("C2", "C", 5., 5.),
            obj("B3", "B", 4.9, 5.1),
        ];
        let index = SpatialIndex::new(2.).unwrap();
        assert_eq!(pair_set(&index, &objects), brute_force(&objects, 2.));
    }

    #[test]
    fn pair_at_exact_threshold_included() {
        let objects = vec![obj("A1", "A", 0., 0.), obj("B1", "B", 2., 0.)];
        let index = SpatialIndex::new(2.).unwrap();
        assert_eq!(pair_set(&index, &objects).len(), 1);
    }

    #[test]
    fn same_type_pairs_excluded() {
        let objects = vec![obj("A1", "A", 0., 0.), obj("A2", "A", 0.5, 0.)];
        let index = SpatialIndex::new(2.).unwrap();
        assert!(pair_set(&index, &objects).is_empty());
    }

    #[test]
    fn collinear_extent_handled() {
        // All objects share a y coordinate, collapsing one grid axis
        let objects = vec![
            obj("A1", "A", 0., 3.),
            obj("B1", "B", 1., 3.),
            obj("C1", "C", 7., 3.),
        ];
        let index = SpatialIndex::new(2.).unwrap();
        assert_eq!(pair_set(&index, &objects), brute_force(&objects, 2.));
    }

    #[test]
    fn max_boundary_object_placed() {
        // B1 sits exactly on the max corner of the grid extent
        let objects = vec![
            obj("A1", "A", 0., 0.),
            obj("A2", "A", 3.9, 3.9),
            obj("B1", "B", 4., 4.),
        ];
        let index = SpatialIndex::new(2.).unwrap();
        assert_eq!(pair_set(&index, &objects), brute_force(&objects, 2.));
    }

    #[test]
    fn tiny_distance_grid_stays_small() {
        // a literal d-sized grid over this extent would need 10^12 cells
        let objects = vec![obj("A1", "A", 0., 0.), obj("B1", "B", 1000., 1000.)];
        let index = SpatialIndex::new(1e-9).unwrap();
        assert!(pair_set(&index, &objects).is_empty());
    }

    #[test]
    fn adjacent_cell_pairs_found_once() {
        // Straddle cell borders in every direction around (5, 5)
        let objects = vec![
            obj("A1", "A", 5., 5.),
            obj("B1", "B", 5.6, 5.6),
            obj("B2", "B", 4.4, 5.6),
            obj("B3", "B", 5.6, 4.4),
            obj("B4", "B", 4.4, 4.4),
        ];
        let index = SpatialIndex::new(1.).unwrap();
        let catalog = FeatureCatalog::from_objects(&objects).unwrap();
        let raw = index.neighbor_pairs(&objects, catalog.assignments());
        let set = pair_set(&index, &objects);
        assert_eq!(raw.len(), set.len(), "pairs must not be emitted twice");
        assert_eq!(set, brute_force(&objects, 1.));
    }
}
