use std::collections::{BTreeMap, HashMap};

use crate::catalog::FeatureId;
use crate::neighborhood::OrderedNeighborhood;

const NO_NEIGHBORS: &[usize] = &[];

/// A node of the neighbor-relationship tree: a tagged variant over the
/// four node kinds (root / feature / instance / instance-vector), each
/// with its own fields.
#[derive(Debug)]
pub enum NRNode {
    Root { children: Vec<NRNode> },
    /// Level 1 (center type) and level 3 (neighbor type), in rank order.
    Feature {
        feature: FeatureId,
        children: Vec<NRNode>,
    },
    /// Level 2: a center object, sorted among siblings by object id.
    Instance { object: usize, children: Vec<NRNode> },
    /// Level 4: the id-sorted neighbors of one type in one ordered
    /// neighborhood.
    InstanceVec { objects: Vec<usize> },
}

/// Four-level index over ordered neighborhoods. Leaves hold indices into
/// the ingested object vector, which must outlive the tree.
#[derive(Debug)]
pub struct NRTree {
    root: Box<NRNode>,
    /// Center object -> (level-1 child slot, level-2 child slot), so a
    /// lookup descends without scanning siblings.
    centers: HashMap<usize, (usize, usize)>,
}

impl NRTree {
    pub fn build(neighborhoods: &BTreeMap<FeatureId, Vec<OrderedNeighborhood>>) -> Self {
        let mut centers = HashMap::new();
        let mut level1 = Vec::with_capacity(neighborhoods.len());
        for (slot1, (&feature, list)) in neighborhoods.iter().enumerate() {
            let mut level2 = Vec::with_capacity(list.len());
            for (slot2, neighborhood) in list.iter().enumerate() {
                let level3 = neighborhood
                    .neighbors
                    .iter()
                    .map(|(&neighbor_feature, objects)| NRNode::Feature {
                        feature: neighbor_feature,
                        children: vec![NRNode::InstanceVec {
                            objects: objects.clone(),
                        }],
                    })
                    .collect();
                centers.insert(neighborhood.center, (slot1, slot2));
                level2.push(NRNode::Instance {
                    object: neighborhood.center,
                    children: level3,
                });
            }
            level1.push(NRNode::Feature {
                feature,
                children: level2,
            });
        }
        Self {
            root: Box::new(NRNode::Root { children: level1 }),
            centers,
        }
    }

    /// The neighbors of `object` whose type is `feature`, in id order;
    /// empty when the object anchors no such neighbors.
    pub fn neighbors_of(&self, object: usize, feature: FeatureId) -> &[usize] {
        let &(slot1, slot2) = match self.centers.get(&object) {
            Some(slots) => slots,
            None => return NO_NEIGHBORS,
        };
        let level1 = match &*self.root {
            NRNode::Root { children } => children,
            _ => return NO_NEIGHBORS,
        };
        let level2 = match &level1[slot1] {
            NRNode::Feature { children, .. } => children,
            _ => return NO_NEIGHBORS,
        };
        let level3 = match &level2[slot2] {
            NRNode::Instance { children, .. } => children,
            _ => return NO_NEIGHBORS,
        };
        // Level-3 siblings are in rank order
        let slot3 = match level3.binary_search_by_key(&feature, |node| match node {
            NRNode::Feature { feature, .. } => *feature,
            _ => FeatureId::MAX,
        }) {
            Ok(slot) => slot,
            Err(_) => return NO_NEIGHBORS,
        };
        if let NRNode::Feature { children, .. } = &level3[slot3] {
            if let Some(NRNode::InstanceVec { objects }) = children.first() {
                return objects;
            }
        }
        NO_NEIGHBORS
    }

    /// Debug dump of the tree structure.
    pub fn print(&self) {
        Self::print_node(&self.root, 0);
    }

    fn print_node(node: &NRNode, level: usize) {
        let indent = "  | ".repeat(level);
        match node {
            NRNode::Root { children } => {
                println!("ROOT");
                for child in children {
                    Self::print_node(child, level + 1);
                }
            }
            NRNode::Feature { feature, children } => {
                println!("{}+ feature {}", indent, feature);
                for child in children {
                    Self::print_node(child, level + 1);
                }
            }
            NRNode::Instance { object, children } => {
                println!("{}- center #{}", indent, object);
                for child in children {
                    Self::print_node(child, level + 1);
                }
            }
            NRNode::InstanceVec { objects } => {
                println!("{}- neighbors {:?}", indent, objects);
            }
        }
    }
}
