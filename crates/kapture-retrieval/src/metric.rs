use serde::{Deserialize, Serialize};

/// Similarity between two global features; larger is more similar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Inner product, for L2-normalised features.
    Dot,
    /// Cosine of the angle between the vectors; 0 if either is zero.
    #[default]
    Cosine,
    /// Negated Euclidean distance.
    NegativeL2,
}

impl SimilarityMetric {
    /// Score of `a` against `b`. Both slices have the same length.
    pub fn score(self, a: &[f32], b: &[f32]) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        let pairs = a.iter().zip(b).map(|(&x, &y)| (f64::from(x), f64::from(y)));
        match self {
            SimilarityMetric::Dot => pairs.map(|(x, y)| x * y).sum(),
            SimilarityMetric::Cosine => {
                let (dot, na, nb) = pairs.fold((0.0, 0.0, 0.0), |(d, na, nb), (x, y)| {
                    (d + x * y, na + x * x, nb + y * y)
                });
                let denom = (na * nb).sqrt();
                if denom > 0.0 {
                    dot / denom
                } else {
                    0.0
                }
            }
            SimilarityMetric::NegativeL2 => -pairs.map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt(),
        }
    }
}
