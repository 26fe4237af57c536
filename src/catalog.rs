use std::collections::{BTreeMap, HashMap, HashSet};

use num_traits::Float;

use crate::error::{ColocationError, Result};
use crate::object::SpatialObject;
use crate::scoring;

/// A feature's rank in the global order: ascending by instance count,
/// ties broken lexicographically by label. Comparing two ids compares
/// the features under that order.
pub type FeatureId = u32;

/// Catalog of the distinct feature types in an object set.
///
/// Built once per run; the feature ordering it fixes is relied on by the
/// neighborhood manager, the NR-tree, and the miner.
#[derive(Debug)]
pub struct FeatureCatalog {
    /// Feature labels, indexed by id (so the vector is in rank order).
    labels: Vec<String>,
    /// Global instance count per feature, indexed by id.
    counts: Vec<usize>,
    by_label: HashMap<String, FeatureId>,
    /// Per input object, the id of its feature type.
    assignments: Vec<FeatureId>,
}

impl FeatureCatalog {
    /// Validates the ingested objects and fixes the feature ordering.
    pub fn from_objects<F>(objects: &[SpatialObject<F>]) -> Result<Self>
    where
        F: Float,
    {
        if objects.is_empty() {
            return Err(ColocationError::EmptyInput);
        }

        let mut seen_ids = HashSet::with_capacity(objects.len());
        let mut label_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for object in objects {
            if !seen_ids.insert(object.id.as_str()) {
                return Err(ColocationError::DuplicateId(object.id.clone()));
            }
            if !object.x.is_finite() || !object.y.is_finite() {
                return Err(ColocationError::NonFiniteCoordinate(object.id.clone()));
            }
            *label_counts.entry(object.kind.as_str()).or_insert(0) += 1;
        }

        let mut ordered: Vec<(&str, usize)> = label_counts.into_iter().collect();
        ordered.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        let labels: Vec<String> = ordered.iter().map(|(l, _)| l.to_string()).collect();
        let counts: Vec<usize> = ordered.iter().map(|(_, c)| *c).collect();
        let by_label: HashMap<String, FeatureId> = labels
            .iter()
            .enumerate()
            .map(|(id, l)| (l.clone(), id as FeatureId))
            .collect();
        let assignments = objects.iter().map(|o| by_label[&o.kind]).collect();

        Ok(Self {
            labels,
            counts,
            by_label,
            assignments,
        })
    }

    /// Global instance count of a feature.
    pub fn count(&self, feature: FeatureId) -> usize {
        self.counts[feature as usize]
    }

    pub fn label(&self, feature: FeatureId) -> &str {
        &self.labels[feature as usize]
    }

    pub fn feature_id(&self, label: &str) -> Option<FeatureId> {
        self.by_label.get(label).copied()
    }

    /// Feature labels in rank order.
    pub fn types_sorted(&self) -> &[String] {
        &self.labels
    }

    /// Number of distinct feature types.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Per-object feature ids, aligned with the ingested object vector.
    pub fn assignments(&self) -> &[FeatureId] {
        &self.assignments
    }

    /// Orders two features; ids are assigned by rank, so this is the id order.
    pub fn compare(&self, f: FeatureId, g: FeatureId) -> std::cmp::Ordering {
        f.cmp(&g)
    }

    /// The dataset-wide dispersion constant controlling the rare-intensity
    /// kernel width.
    pub fn dispersion<F>(&self) -> F
    where
        F: Float,
    {
        scoring::dispersion(&self.counts)
    }
}
