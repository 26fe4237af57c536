use std::collections::{BTreeMap, HashMap};

use num_traits::Float;

use crate::catalog::FeatureId;
use crate::object::SpatialObject;

/// The ordered neighborhood of a center object: its neighbors restricted
/// to feature types ranked strictly after the center's own type, grouped
/// by neighbor type. Every neighbor pair lands in exactly one ordered
/// neighborhood, so each co-location instance is materialized exactly
/// once, through its minimum-feature anchor.
#[derive(Debug)]
pub struct OrderedNeighborhood {
    pub center: usize,
    pub neighbors: BTreeMap<FeatureId, Vec<usize>>,
}

/// Groups neighbor pairs into ordered neighborhoods, keyed by the center's
/// feature type. Centers under each type are sorted by object id, as is
/// each per-type neighbor list.
pub fn ordered_neighborhoods<F>(
    pairs: &[(usize, usize)],
    kinds: &[FeatureId],
    objects: &[SpatialObject<F>],
) -> BTreeMap<FeatureId, Vec<OrderedNeighborhood>>
where
    F: Float,
{
    let mut by_center: HashMap<usize, BTreeMap<FeatureId, Vec<usize>>> = HashMap::new();
    for &(a, b) in pairs {
        debug_assert_ne!(kinds[a], kinds[b], "same-type pairs are excluded upstream");
        let (center, neighbor) = if kinds[a] < kinds[b] { (a, b) } else { (b, a) };
        by_center
            .entry(center)
            .or_insert_with(BTreeMap::new)
            .entry(kinds[neighbor])
            .or_insert_with(Vec::new)
            .push(neighbor);
    }

    let mut grouped: BTreeMap<FeatureId, Vec<OrderedNeighborhood>> = BTreeMap::new();
    for (center, mut neighbors) in by_center {
        for list in neighbors.values_mut() {
            list.sort_by(|&a, &b| objects[a].id.cmp(&objects[b].id));
        }
        grouped
            .entry(kinds[center])
            .or_insert_with(Vec::new)
            .push(OrderedNeighborhood { center, neighbors });
    }
    for list in grouped.values_mut() {
        list.sort_by(|a, b| objects[a.center].id.cmp(&objects[b.center].id));
    }
    grouped
}
