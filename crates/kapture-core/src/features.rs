//! Local and global image features, keyed by image name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Describes the arrays stored in a [`FeatureSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureType {
    /// Extractor name, e.g. `"sift"`, `"r2d2"`, `"apgem"`.
    pub name: String,
    /// Element type of the original data, e.g. `"float32"`, `"uint8"`.
    pub dtype: String,
    /// Number of values per row.
    pub dsize: usize,
}

impl FeatureType {
    pub fn new(name: impl Into<String>, dtype: impl Into<String>, dsize: usize) -> Self {
        Self {
            name: name.into(),
            dtype: dtype.into(),
            dsize,
        }
    }
}

/// Row-major 2D array of `f32` values with `dsize` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureArray {
    dsize: usize,
    values: Vec<f32>,
}

impl FeatureArray {
    /// Wrap flat row-major values. Shape is validated on dataset insertion.
    pub fn new(dsize: usize, values: Vec<f32>) -> Self {
        Self { dsize, values }
    }

    /// A single-row array, as used for global features.
    pub fn single(values: Vec<f32>) -> Self {
        Self {
            dsize: values.len(),
            values,
        }
    }

    pub fn from_rows<const N: usize>(rows: &[[f32; N]]) -> Self {
        Self {
            dsize: N,
            values: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn dsize(&self) -> usize {
        self.dsize
    }

    /// Number of rows; zero for a malformed array.
    pub fn rows(&self) -> usize {
        if self.dsize == 0 {
            0
        } else {
            self.values.len() / self.dsize
        }
    }

    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let start = i.checked_mul(self.dsize)?;
        self.values.get(start..start + self.dsize)
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Non-zero width and a whole number of rows.
    pub fn is_well_formed(&self) -> bool {
        self.dsize > 0 && self.values.len() % self.dsize == 0
    }
}

/// Feature arrays of one type, one array per image.
///
/// Used for keypoints, descriptors and global features alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    feature_type: FeatureType,
    images: BTreeMap<String, FeatureArray>,
}

/// Keypoint locations (x, y and optional shape values per row).
pub type Keypoints = FeatureSet;
/// Local descriptors, one row per keypoint.
pub type Descriptors = FeatureSet;
/// Whole-image descriptors, a single row per image.
pub type GlobalFeatures = FeatureSet;

impl FeatureSet {
    pub fn new(feature_type: FeatureType) -> Self {
        Self {
            feature_type,
            images: BTreeMap::new(),
        }
    }

    pub fn feature_type(&self) -> &FeatureType {
        &self.feature_type
    }

    pub fn get(&self, image: &str) -> Option<&FeatureArray> {
        self.images.get(image)
    }

    pub fn contains(&self, image: &str) -> bool {
        self.images.contains_key(image)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Entries ordered by image name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureArray)> {
        self.images.iter().map(|(name, arr)| (name.as_str(), arr))
    }

    /// Insert without dataset-level checks; returns `false` if `image` exists.
    ///
    /// Suitable for standalone sets such as pair-generator inputs.
    pub fn insert(&mut self, image: impl Into<String>, array: FeatureArray) -> bool {
        use std::collections::btree_map::Entry;
        match self.images.entry(image.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(array);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_shape() {
        let arr = FeatureArray::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert_eq!(arr.rows(), 3);
        assert_eq!(arr.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(arr.row(3), None);
        assert!(arr.is_well_formed());
        assert!(!FeatureArray::new(3, vec![0.0; 4]).is_well_formed());
        assert!(!FeatureArray::new(0, vec![]).is_well_formed());
    }

    #[test]
    fn set_keeps_first_entry() {
        let mut set = FeatureSet::new(FeatureType::new("netvlad", "float32", 2));
        assert!(set.insert("a.jpg", FeatureArray::single(vec![1.0, 0.0])));
        assert!(!set.insert("a.jpg", FeatureArray::single(vec![0.0, 1.0])));
        assert_eq!(set.get("a.jpg").unwrap().values(), &[1.0, 0.0]);
    }
}
