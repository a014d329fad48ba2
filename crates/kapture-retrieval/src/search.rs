//! Nearest-neighbour search over mapping features.
//!
//! [`NeighborSearch`] is the seam for acceleration structures. An
//! implementation returns, for one query vector, the best `k` mapping
//! entries ordered by score descending and then by mapping name ascending.
//! Approximate indices may miss true neighbours but must keep that order.

use std::cmp::Ordering;

use kapture_core::GlobalFeatures;

use crate::{PairingError, SimilarityMetric};

/// One search hit: position of a mapping entry and its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub score: f64,
}

/// Ranked lookup over a fixed set of named mapping vectors.
pub trait NeighborSearch {
    /// Number of indexed mapping entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension of indexed vectors.
    fn dim(&self) -> usize;

    /// Name of the mapping entry at `index`.
    fn name(&self, index: usize) -> &str;

    /// The best `k` entries for `query`, best first.
    fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor>;
}

/// Exact search by scoring every mapping entry.
#[derive(Debug, Clone)]
pub struct BruteForceIndex {
    metric: SimilarityMetric,
    dim: usize,
    names: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl BruteForceIndex {
    /// Index every entry of `features`. Entries are kept in name order.
    pub fn new(features: &GlobalFeatures, metric: SimilarityMetric) -> Result<Self, PairingError> {
        let dim = features.feature_type().dsize;
        let mut names = Vec::with_capacity(features.len());
        let mut vectors = Vec::with_capacity(features.len());
        for (image, array) in features.iter() {
            vectors.push(checked_vector(image, array, dim)?.to_vec());
            names.push(image.to_string());
        }
        Ok(Self {
            metric,
            dim,
            names,
            vectors,
        })
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }
}

impl NeighborSearch for BruteForceIndex {
    fn len(&self) -> usize {
        self.names.len()
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor> {
        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, v)| Neighbor {
                index,
                score: self.metric.score(query, v),
            })
            .collect();
        // names are sorted, so a smaller index is a smaller name
        hits.sort_by(rank);
        hits.truncate(k);
        hits
    }
}

/// Score descending, then index ascending. `-0.0` and `0.0` tie.
pub(crate) fn rank(a: &Neighbor, b: &Neighbor) -> Ordering {
    let unsigned = |s: f64| if s == 0.0 { 0.0 } else { s };
    unsigned(b.score)
        .total_cmp(&unsigned(a.score))
        .then(a.index.cmp(&b.index))
}

/// The single row of a global feature, checked for shape and finiteness.
pub(crate) fn checked_vector<'a>(
    image: &str,
    array: &'a kapture_core::FeatureArray,
    dim: usize,
) -> Result<&'a [f32], PairingError> {
    if array.dsize() != dim {
        return Err(PairingError::DimensionMismatch {
            image: image.to_string(),
            expected: dim,
            actual: array.dsize(),
        });
    }
    let row = match (array.rows(), array.row(0)) {
        (1, Some(row)) => row,
        (rows, _) => {
            return Err(PairingError::NotSingleRow {
                image: image.to_string(),
                rows,
            })
        }
    };
    if row.iter().any(|x| !x.is_finite()) {
        return Err(PairingError::NonFinite {
            image: image.to_string(),
        });
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kapture_core::{FeatureArray, FeatureSet, FeatureType};

    fn features(rows: &[(&str, [f32; 2])]) -> GlobalFeatures {
        let mut set = FeatureSet::new(FeatureType::new("toy", "float32", 2));
        for (name, v) in rows {
            set.insert(*name, FeatureArray::single(v.to_vec()));
        }
        set
    }

    #[test]
    fn search_ranks_by_score_then_name() {
        let index = BruteForceIndex::new(
            &features(&[("c", [1.0, 0.0]), ("a", [1.0, 0.0]), ("b", [0.0, 1.0])]),
            SimilarityMetric::Dot,
        )
        .unwrap();
        let hits = index.search(&[1.0, 0.0], 3);
        let names: Vec<_> = hits.iter().map(|h| index.name(h.index)).collect();
        assert_eq!(names, ["a", "c", "b"]);
        assert_eq!(index.search(&[1.0, 0.0], 1).len(), 1);
        assert_eq!(index.search(&[1.0, 0.0], 10).len(), 3);
    }

    #[test]
    fn signed_zero_scores_tie_on_name() {
        let index = BruteForceIndex::new(
            &features(&[("b", [0.0, 0.0]), ("a", [-0.0, -0.0])]),
            SimilarityMetric::Dot,
        )
        .unwrap();
        let hits = index.search(&[1.0, 0.0], 2);
        assert!(hits[0].score == hits[1].score);
        let names: Vec<_> = hits.iter().map(|h| index.name(h.index)).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn malformed_vectors_are_rejected() {
        let mut set = features(&[("a", [1.0, 0.0])]);
        set.insert("nan", FeatureArray::single(vec![f32::NAN, 0.0]));
        let err = BruteForceIndex::new(&set, SimilarityMetric::Cosine).unwrap_err();
        assert_eq!(
            err,
            PairingError::NonFinite {
                image: "nan".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "global feature of `nan` contains non-finite values"
        );

        let mut set = features(&[("a", [1.0, 0.0])]);
        set.insert("two", FeatureArray::new(2, vec![0.0; 4]));
        assert!(matches!(
            BruteForceIndex::new(&set, SimilarityMetric::Cosine),
            Err(PairingError::NotSingleRow { rows: 2, .. })
        ));

        let mut set = features(&[("a", [1.0, 0.0])]);
        set.insert("wide", FeatureArray::single(vec![0.0; 3]));
        assert!(matches!(
            BruteForceIndex::new(&set, SimilarityMetric::Cosine),
            Err(PairingError::DimensionMismatch { expected: 2, actual: 3, .. })
        ));
    }
}
