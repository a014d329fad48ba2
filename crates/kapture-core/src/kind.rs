use serde::{Deserialize, Serialize};
use std::fmt;

/// The entity kinds held by a [`crate::Dataset`].
///
/// Declaration order is dependency order: a kind may only reference kinds
/// declared before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Sensors,
    Rigs,
    RecordsCamera,
    RecordsLidar,
    RecordsGnss,
    Trajectories,
    Keypoints,
    Descriptors,
    GlobalFeatures,
    Matches,
    Points3d,
    Observations,
}

impl EntityKind {
    /// Every kind, in dependency order.
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Sensors,
        EntityKind::Rigs,
        EntityKind::RecordsCamera,
        EntityKind::RecordsLidar,
        EntityKind::RecordsGnss,
        EntityKind::Trajectories,
        EntityKind::Keypoints,
        EntityKind::Descriptors,
        EntityKind::GlobalFeatures,
        EntityKind::Matches,
        EntityKind::Points3d,
        EntityKind::Observations,
    ];

    /// Stable snake_case name, identical to the serde representation.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Sensors => "sensors",
            EntityKind::Rigs => "rigs",
            EntityKind::RecordsCamera => "records_camera",
            EntityKind::RecordsLidar => "records_lidar",
            EntityKind::RecordsGnss => "records_gnss",
            EntityKind::Trajectories => "trajectories",
            EntityKind::Keypoints => "keypoints",
            EntityKind::Descriptors => "descriptors",
            EntityKind::GlobalFeatures => "global_features",
            EntityKind::Matches => "matches",
            EntityKind::Points3d => "points3d",
            EntityKind::Observations => "observations",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
