use thiserror::Error;

use crate::{EntityKind, RecordKey};

/// An insertion would violate a dataset invariant.
///
/// Raised before any mutation happens, so the dataset is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsistencyError {
    /// An entry with this identifier already exists.
    #[error("duplicate {kind} entry `{id}`")]
    Duplicate { kind: EntityKind, id: String },
    /// Referenced sensor is not declared.
    #[error("unknown sensor `{0}`")]
    UnknownSensor(String),
    /// Record kind does not match the kind of its sensor.
    #[error("sensor `{sensor}` is a {actual} sensor, cannot hold {expected} records")]
    SensorKindMismatch {
        sensor: String,
        expected: &'static str,
        actual: &'static str,
    },
    /// Rig id collides with a sensor id, or a rig has no members.
    #[error("invalid rig `{rig}`: {reason}")]
    InvalidRig { rig: String, reason: String },
    /// Trajectory entry has no corresponding record.
    #[error("no record for pose at {0}")]
    UnknownRecord(RecordKey),
    /// Pose carries neither rotation nor translation.
    #[error("pose at {0} has neither rotation nor translation")]
    EmptyPose(RecordKey),
    /// No camera record uses this image name.
    #[error("unknown image `{0}`")]
    UnknownImage(String),
    /// Image name is already used by another camera record.
    #[error("image `{image}` is already recorded at {existing}")]
    DuplicateImageName { image: String, existing: RecordKey },
    /// Feature array shape does not match the declared feature type.
    #[error("{kind} for `{image}`: {reason}")]
    BadFeatureShape {
        kind: EntityKind,
        image: String,
        reason: String,
    },
    /// Feature type differs from the one already declared for this kind.
    #[error("{kind} already declared as `{expected}`, got `{actual}`")]
    FeatureTypeMismatch {
        kind: EntityKind,
        expected: String,
        actual: String,
    },
    /// Matches require keypoints on both sides.
    #[error("matches reference `{0}` which has no keypoints")]
    MissingKeypoints(String),
    /// A keypoint index is beyond the image's keypoint count.
    #[error("keypoint index {index} out of range for `{image}` ({count} keypoints)")]
    KeypointOutOfRange {
        image: String,
        index: usize,
        count: usize,
    },
    /// An image cannot be matched against itself.
    #[error("matches of `{0}` against itself")]
    SelfMatch(String),
    /// Observation references an undeclared 3D point.
    #[error("unknown 3D point {0}")]
    UnknownPoint(u64),
    /// A numeric payload holds NaN or an infinity.
    #[error("{kind} entry `{id}` holds non-finite values")]
    NonFinite { kind: EntityKind, id: String },
}
