use std::collections::BTreeMap;

use crate::{ConsistencyError, EntityKind, Pose, PoseConvention, RecordKey, Timestamp};

/// Poses over time for one or more sensors or rigs.
///
/// Sparse by construction: a key without a pose is simply absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    convention: PoseConvention,
    poses: BTreeMap<RecordKey, Pose>,
}

impl Trajectory {
    pub fn new(convention: PoseConvention) -> Self {
        Self {
            convention,
            poses: BTreeMap::new(),
        }
    }

    pub fn convention(&self) -> PoseConvention {
        self.convention
    }

    /// Add a pose. Fails on an already-present key, an empty pose or a
    /// non-finite component.
    pub fn insert(&mut self, key: RecordKey, pose: Pose) -> Result<(), ConsistencyError> {
        if pose.is_empty() {
            return Err(ConsistencyError::EmptyPose(key));
        }
        if !pose.is_finite() {
            return Err(ConsistencyError::NonFinite {
                kind: EntityKind::Trajectories,
                id: key.to_string(),
            });
        }
        if self.poses.contains_key(&key) {
            return Err(ConsistencyError::Duplicate {
                kind: EntityKind::Trajectories,
                id: key.to_string(),
            });
        }
        self.poses.insert(key, pose);
        Ok(())
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Pose> {
        self.poses.get(key)
    }

    pub fn pose(&self, timestamp: Timestamp, sensor_id: &str) -> Option<&Pose> {
        self.poses.get(&RecordKey::new(timestamp, sensor_id))
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.poses.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordKey, &Pose)> {
        self.poses.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RecordKey> {
        self.poses.keys()
    }
}
