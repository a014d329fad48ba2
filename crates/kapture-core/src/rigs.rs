use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Pose, SensorId};

/// A rigid assembly of sensors.
///
/// Each member stores `sensor_from_rig`, the transform from rig frame to
/// sensor frame, so that `sensor_from_world = sensor_from_rig ∘ rig_from_world`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rig {
    members: BTreeMap<SensorId, Pose>,
}

impl Rig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style member insertion; a repeated sensor id replaces the pose.
    pub fn with_member(mut self, sensor_id: impl Into<SensorId>, sensor_from_rig: Pose) -> Self {
        self.members.insert(sensor_id.into(), sensor_from_rig);
        self
    }

    pub fn member(&self, sensor_id: &str) -> Option<&Pose> {
        self.members.get(sensor_id)
    }

    pub fn members(&self) -> impl Iterator<Item = (&SensorId, &Pose)> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
