//! Image retrieval: ranks mapping images for every query image by
//! global-feature similarity and emits the best candidate pairs for a later
//! matching stage.
//!
//! Query rows are scored independently and in parallel (rayon); the output
//! order does not depend on scheduling. The default search is exhaustive
//! ([`BruteForceIndex`]); other indices plug in through [`NeighborSearch`].
//!
//! ```
//! use kapture_core::{FeatureArray, FeatureSet, FeatureType};
//! use kapture_retrieval::{generate_pairs, PairingOptions};
//!
//! let mut mapping = FeatureSet::new(FeatureType::new("netvlad", "float32", 2));
//! mapping.insert("map/0.jpg", FeatureArray::single(vec![1.0, 0.0]));
//! mapping.insert("map/1.jpg", FeatureArray::single(vec![0.0, 1.0]));
//! let mut query = FeatureSet::new(FeatureType::new("netvlad", "float32", 2));
//! query.insert("query/0.jpg", FeatureArray::single(vec![0.1, 0.9]));
//!
//! let pairs = generate_pairs(&mapping, &query, &PairingOptions::with_top_k(1)).unwrap();
//! assert_eq!(pairs[0].mapping, "map/1.jpg");
//! ```

mod error;
mod metric;
mod pairs;
mod search;

pub use error::*;
pub use metric::*;
pub use pairs::*;
pub use search::{BruteForceIndex, Neighbor, NeighborSearch};
