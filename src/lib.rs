pub use catalog::{FeatureCatalog, FeatureId};
pub use error::{ColocationError, Result};
pub use miner::{Colocation, ColocationMiner};
pub use neighborhood::{ordered_neighborhoods, OrderedNeighborhood};
pub use nr_tree::{NRNode, NRTree};
pub use object::SpatialObject;
pub use spatial_index::SpatialIndex;

mod catalog;
mod error;
mod miner;
mod neighborhood;
mod nr_tree;
mod object;
mod scoring;
mod spatial_index;
