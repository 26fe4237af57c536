use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;

use log::{debug, info};
use num_traits::Float;
use rayon::prelude::*;

use crate::catalog::{FeatureCatalog, FeatureId};
use crate::error::{ColocationError, Result};
use crate::neighborhood::ordered_neighborhoods;
use crate::nr_tree::NRTree;
use crate::object::SpatialObject;
use crate::scoring;
use crate::spatial_index::SpatialIndex;

/// A co-location pattern: feature ids in rank order, strictly ascending.
pub type Colocation = Vec<FeatureId>;

/// A row instance: object indices, column `i` holding an object of the
/// pattern's `i`-th feature.
type Row = Vec<usize>;

type TableStore = HashMap<Colocation, Vec<Row>>;

/// Level-wise miner for prevalent spatial co-locations under the weighted
/// participation index.
///
///     use colocmine::{ColocationMiner, SpatialObject};
///
///     let objects = vec![
///         SpatialObject::new("A1", "A", 0.0, 0.0),
///         SpatialObject::new("B1", "B", 1.0, 0.0),
///     ];
///     let miner = ColocationMiner::new(2.0, 0.5, 2).unwrap();
///     let patterns = miner.mine(&objects).unwrap();
///     assert_eq!(patterns, vec![vec!["A".to_string(), "B".to_string()]]);
pub struct ColocationMiner<F> {
    neighbor_distance: F,
    min_prev: F,
    workers: usize,
}

impl<F> ColocationMiner<F>
where
    F: Float + Send + Sync,
{
    /// Validates the configuration up front; no work happens until
    /// [`ColocationMiner::mine`].
    pub fn new(neighbor_distance: F, min_prev: F, workers: usize) -> Result<Self> {
        if !(neighbor_distance > F::zero()) {
            return Err(ColocationError::InvalidDistance(
                neighbor_distance.to_f64().unwrap_or(f64::NAN),
            ));
        }
        if !(min_prev >= F::zero() && min_prev <= F::one()) {
            return Err(ColocationError::InvalidThreshold(
                min_prev.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(Self {
            neighbor_distance,
            min_prev,
            workers: workers.max(1),
        })
    }

    /// Mines every prevalent co-location of size >= 2, returned as
    /// rank-ordered label sequences, ascending by pattern size.
    pub fn mine(&self, objects: &[SpatialObject<F>]) -> Result<Vec<Vec<String>>> {
        let catalog = FeatureCatalog::from_objects(objects)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .unwrap();
        pool.install(|| self.mine_inner(objects, &catalog))
    }

    fn mine_inner(
        &self,
        objects: &[SpatialObject<F>],
        catalog: &FeatureCatalog,
    ) -> Result<Vec<Vec<String>>> {
        let start = Instant::now();

        let index = SpatialIndex::new(self.neighbor_distance)?;
        let pairs = index.neighbor_pairs(objects, catalog.assignments());
        info!(
            "{} neighbor pairs among {} objects of {} feature types",
            pairs.len(),
            objects.len(),
            catalog.len()
        );

        let neighborhoods = ordered_neighborhoods(&pairs, catalog.assignments(), objects);
        let tree = NRTree::build(&neighborhoods);
        drop(neighborhoods);

        let level_miner = LevelMiner {
            catalog,
            tree: &tree,
            delta: catalog.dispersion(),
            min_prev: self.min_prev,
        };
        let found = level_miner.run()?;
        info!(
            "mining finished in {:?}: {} prevalent patterns",
            start.elapsed(),
            found.len()
        );

        Ok(found
            .iter()
            .map(|pattern| {
                pattern
                    .iter()
                    .map(|&f| catalog.label(f).to_string())
                    .collect()
            })
            .collect())
    }
}

/// One mining run's shared read-only state; drives the per-level loop.
struct LevelMiner<'a, F> {
    catalog: &'a FeatureCatalog,
    tree: &'a NRTree,
    delta: F,
    min_prev: F,
}

impl<'a, F> LevelMiner<'a, F>
where
    F: Float + Send + Sync,
{
    fn run(&self) -> Result<Vec<Colocation>> {
        // Level 1: every feature is trivially prevalent, with one
        // single-object row per instance. Singletons seed the loop but are
        // not part of the returned set.
        let mut prev_prevalent: Vec<Colocation> = (0..self.catalog.len() as FeatureId)
            .map(|f| vec![f])
            .collect();
        let mut prev_tables = TableStore::new();
        for f in 0..self.catalog.len() as FeatureId {
            let rows: Vec<Row> = self
                .catalog
                .assignments()
                .iter()
                .enumerate()
                .filter(|&(_, &kind)| kind == f)
                .map(|(index, _)| vec![index])
                .collect();
            prev_tables.insert(vec![f], rows);
        }

        let mut result = Vec::new();
        let mut k = 2;
        loop {
            let level_start = Instant::now();
            let mut candidates = generate_candidates(&prev_prevalent);
            if candidates.is_empty() {
                break;
            }
            if k > 2 {
                candidates = self.filter_candidates(candidates, &prev_prevalent, &prev_tables);
            }
            let tables = self.gen_table_instance(&candidates, &prev_tables, k)?;
            let prevalent = self.select_prevalent(&candidates, &tables);
            debug!(
                "level {}: {} candidates, {} non-empty tables, {} prevalent in {:?}",
                k,
                candidates.len(),
                tables.len(),
                prevalent.len(),
                level_start.elapsed()
            );
            result.extend(prevalent.iter().cloned());
            if prevalent.is_empty() {
                break;
            }
            prev_prevalent = prevalent;
            prev_tables = tables;
            k += 1;
        }
        Ok(result)
    }

    /// Candidate pruning for levels above 2. Deleting any non-minimum
    /// feature must leave a prevalent pattern; deleting the minimum
    /// feature admits the candidate only if the weighted upper bound can
    /// still reach the threshold.
    fn filter_candidates(
        &self,
        candidates: Vec<Colocation>,
        prev_prevalent: &[Colocation],
        prev_tables: &TableStore,
    ) -> Vec<Colocation> {
        let prev_set: HashSet<&Colocation> = prev_prevalent.iter().collect();
        candidates
            .into_iter()
            .filter(|candidate| {
                for i in 1..candidate.len() {
                    let mut subset = candidate.clone();
                    subset.remove(i);
                    if !prev_set.contains(&subset) {
                        return false;
                    }
                }
                let tail: Colocation = candidate[1..].to_vec();
                let pi = match prev_tables.get(&tail) {
                    Some(rows) => scoring::participation_index(&tail, rows, self.catalog),
                    None => F::zero(),
                };
                let f_max = *candidate.last().unwrap();
                let bound = pi
                    * scoring::weight(scoring::rare_intensity(
                        f_max,
                        candidate,
                        self.catalog,
                        self.delta,
                    ));
                bound >= self.min_prev
            })
            .collect()
    }

    /// Extends every prefix row by the candidate's last feature through
    /// NR-tree leaf intersection. Empty tables are omitted.
    fn gen_table_instance(
        &self,
        candidates: &[Colocation],
        prev_tables: &TableStore,
        k: usize,
    ) -> Result<TableStore> {
        let mut tables = TableStore::new();
        for candidate in candidates {
            if candidate.len() != k || candidate.windows(2).any(|w| w[0] >= w[1]) {
                return Err(self.invariant_violation(candidate, k, "candidate not rank-ordered"));
            }
            let (&new_feature, prefix) = match candidate.split_last() {
                Some(split) => split,
                None => continue,
            };
            let prefix: Colocation = prefix.to_vec();
            let rows = match prev_tables.get(&prefix) {
                Some(rows) if !rows.is_empty() => rows,
                _ => continue,
            };
            let extended: Vec<Row> = rows
                .par_iter()
                .flat_map_iter(|row| {
                    self.extended_set(row, new_feature)
                        .into_iter()
                        .map(move |object| {
                            let mut next = row.clone();
                            next.push(object);
                            next
                        })
                })
                .collect();
            debug_assert!(
                {
                    let mut seen = HashSet::new();
                    extended.iter().all(|row| seen.insert(row.clone()))
                },
                "ordered neighborhoods must not produce duplicate rows"
            );
            if !extended.is_empty() {
                tables.insert(candidate.clone(), extended);
            }
        }
        Ok(tables)
    }

    /// `S(I, f)`: the intersection of every row member's f-typed neighbor
    /// leaf, terminating as soon as the running intersection empties.
    fn extended_set(&self, row: &[usize], feature: FeatureId) -> Vec<usize> {
        let mut members = row.iter();
        let first = match members.next() {
            Some(&object) => object,
            None => return Vec::new(),
        };
        let mut current = self.tree.neighbors_of(first, feature).to_vec();
        for &object in members {
            if current.is_empty() {
                break;
            }
            let next: HashSet<usize> = self
                .tree
                .neighbors_of(object, feature)
                .iter()
                .copied()
                .collect();
            current.retain(|candidate| next.contains(candidate));
        }
        current
    }

    /// Keeps the candidates whose weighted participation index reaches the
    /// threshold. Candidates without rows never qualify.
    fn select_prevalent(&self, candidates: &[Colocation], tables: &TableStore) -> Vec<Colocation> {
        candidates
            .par_iter()
            .filter(|candidate| match tables.get(*candidate) {
                Some(rows) => {
                    let wpi: F = scoring::weighted_participation_index(
                        candidate.as_slice(),
                        rows,
                        self.catalog,
                        self.delta,
                    );
                    wpi >= self.min_prev
                }
                None => false,
            })
            .cloned()
            .collect()
    }

    fn invariant_violation(
        &self,
        candidate: &Colocation,
        level: usize,
        msg: &str,
    ) -> ColocationError {
        let pattern = candidate
            .iter()
            .map(|&f| self.catalog.label(f))
            .collect::<Vec<_>>()
            .join(", ");
        ColocationError::InternalInvariant {
            pattern,
            level,
            msg: msg.to_string(),
        }
    }
}

/// Joins every pair of size-(k-1) patterns sharing a (k-2)-prefix; the
/// joined candidate extends the shared prefix by both last features, the
/// later-ranked one landing last, so candidates stay rank-ordered.
fn generate_candidates(prev_prevalent: &[Colocation]) -> Vec<Colocation> {
    let mut candidates = BTreeSet::new();
    for i in 0..prev_prevalent.len() {
        for j in (i + 1)..prev_prevalent.len() {
            let a = &prev_prevalent[i];
            let b = &prev_prevalent[j];
            let prefix_len = a.len() - 1;
            if a[..prefix_len] != b[..prefix_len] {
                continue;
            }
            let last_a = a[prefix_len];
            let last_b = b[prefix_len];
            let mut candidate = a[..prefix_len].to_vec();
            candidate.push(last_a.min(last_b));
            candidate.push(last_a.max(last_b));
            candidates.insert(candidate);
        }
    }
    candidates.into_iter().collect()
}
