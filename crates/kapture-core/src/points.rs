//! 3D points and their 2D observations.

use serde::{Deserialize, Serialize};

use crate::Pt3;

/// Identifier of a 3D point.
pub type PointId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3d {
    pub position: Pt3,
    /// RGB colour, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[u8; 3]>,
}

impl Point3d {
    pub fn new(position: Pt3) -> Self {
        Self {
            position,
            color: None,
        }
    }

    pub fn with_color(position: Pt3, color: [u8; 3]) -> Self {
        Self {
            position,
            color: Some(color),
        }
    }
}

/// A 3D point seen as keypoint `keypoint` of image `image`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Observation {
    pub image: String,
    pub keypoint: usize,
}

impl Observation {
    pub fn new(image: impl Into<String>, keypoint: usize) -> Self {
        Self {
            image: image.into(),
            keypoint,
        }
    }
}
