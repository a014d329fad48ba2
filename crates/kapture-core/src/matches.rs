//! 2D-2D keypoint matches between image pairs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An unordered image pair, stored with `first <= second`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImagePair {
    first: String,
    second: String,
}

impl ImagePair {
    /// Canonical pair; also reports whether the inputs were swapped.
    pub fn canonical(a: impl Into<String>, b: impl Into<String>) -> (Self, bool) {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            (Self { first: a, second: b }, false)
        } else {
            (Self { first: b, second: a }, true)
        }
    }

    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::canonical(a, b).0
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }
}

/// Correspondence between keypoint `first` of one image and `second` of the other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub first: usize,
    pub second: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Match {
    pub fn new(first: usize, second: usize) -> Self {
        Self {
            first,
            second,
            score: None,
        }
    }

    pub fn with_score(first: usize, second: usize, score: f32) -> Self {
        Self {
            first,
            second,
            score: Some(score),
        }
    }

    pub fn swapped(self) -> Self {
        Self {
            first: self.second,
            second: self.first,
            score: self.score,
        }
    }
}

/// All matches of a dataset, keyed by canonical pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matches {
    pairs: BTreeMap<ImagePair, Vec<Match>>,
}

impl Matches {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.pairs.contains_key(&ImagePair::new(a, b))
    }

    /// Matches stored for the pair, in canonical orientation.
    pub fn get(&self, pair: &ImagePair) -> Option<&[Match]> {
        self.pairs.get(pair).map(Vec::as_slice)
    }

    /// Matches between `a` and `b`, oriented so that `first` indexes `a`.
    pub fn between(&self, a: &str, b: &str) -> Option<Vec<Match>> {
        let (pair, swapped) = ImagePair::canonical(a, b);
        let stored = self.pairs.get(&pair)?;
        Some(if swapped {
            stored.iter().map(|m| m.swapped()).collect()
        } else {
            stored.clone()
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ImagePair, &[Match])> {
        self.pairs.iter().map(|(p, m)| (p, m.as_slice()))
    }

    pub(crate) fn insert_unchecked(&mut self, pair: ImagePair, matches: Vec<Match>) {
        self.pairs.insert(pair, matches);
    }
}
