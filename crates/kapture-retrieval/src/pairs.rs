//! Top-k image-pair generation.

use std::collections::HashSet;

use kapture_core::GlobalFeatures;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::search::checked_vector;
use crate::{BruteForceIndex, NeighborSearch, PairingError, SimilarityMetric};

/// Options for [`generate_pairs`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingOptions {
    /// Number of mapping images retained per query image. Must be at least 1.
    pub top_k: usize,
    pub metric: SimilarityMetric,
    /// Keep a query paired with itself when it is also a mapping image.
    pub include_self: bool,
}

impl Default for PairingOptions {
    fn default() -> Self {
        Self {
            top_k: 20,
            metric: SimilarityMetric::default(),
            include_self: true,
        }
    }
}

impl PairingOptions {
    pub fn with_top_k(top_k: usize) -> Self {
        Self {
            top_k,
            ..Self::default()
        }
    }
}

/// A candidate (query, mapping) pair with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePairScore {
    pub query: String,
    pub mapping: String,
    pub score: f64,
}

/// Pair every query image with its `top_k` most similar mapping images.
///
/// Pairs are listed by query name, then by decreasing score, then by mapping
/// name. When an unordered combination is produced twice (e.g. `a -> b` and
/// `b -> a` in self-retrieval), only the first occurrence is kept, so a query
/// may then list fewer than `top_k` pairs.
pub fn generate_pairs(
    mapping: &GlobalFeatures,
    query: &GlobalFeatures,
    options: &PairingOptions,
) -> Result<Vec<ImagePairScore>, PairingError> {
    let index = BruteForceIndex::new(mapping, options.metric)?;
    generate_pairs_with(&index, query, options)
}

/// Same as [`generate_pairs`] with a caller-provided search structure.
///
/// `options.metric` is ignored here; the index scores with its own metric.
pub fn generate_pairs_with<S>(
    index: &S,
    query: &GlobalFeatures,
    options: &PairingOptions,
) -> Result<Vec<ImagePairScore>, PairingError>
where
    S: NeighborSearch + Sync,
{
    if options.top_k == 0 {
        return Err(PairingError::ZeroTopK);
    }
    let rows = query
        .iter()
        .map(|(image, array)| checked_vector(image, array, index.dim()).map(|v| (image, v)))
        .collect::<Result<Vec<_>, _>>()?;

    // one extra candidate leaves room for dropping the query itself
    let k = if options.include_self {
        options.top_k
    } else {
        options.top_k.saturating_add(1)
    };
    let per_query: Vec<Vec<ImagePairScore>> = rows
        .par_iter()
        .map(|&(image, vector)| {
            index
                .search(vector, k)
                .into_iter()
                .map(|hit| (index.name(hit.index), hit.score))
                .filter(|(name, _)| options.include_self || *name != image)
                .take(options.top_k)
                .map(|(name, score)| ImagePairScore {
                    query: image.to_string(),
                    mapping: name.to_string(),
                    score,
                })
                .collect()
        })
        .collect();

    let mut seen = HashSet::new();
    let mut pairs = Vec::new();
    let mut dropped = 0usize;
    for pair in per_query.into_iter().flatten() {
        let key = if pair.query <= pair.mapping {
            (pair.query.clone(), pair.mapping.clone())
        } else {
            (pair.mapping.clone(), pair.query.clone())
        };
        if seen.insert(key) {
            pairs.push(pair);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!("dropped {dropped} pairs already listed in the other direction");
    }
    info!(
        "generated {} pairs for {} queries against {} mapping images (top {})",
        pairs.len(),
        rows.len(),
        index.len(),
        options.top_k
    );
    Ok(pairs)
}
