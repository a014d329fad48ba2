//! High-level entry crate for the kapture toolbox.
//!
//! Visual-localization pipelines exchange their data through one canonical
//! [`Dataset`](core::Dataset): sensors, records, poses, features, matches and
//! 3D points. This crate gathers the building blocks around it:
//!
//! - **[`core`]**: the dataset model and its validating insertion API,
//! - **[`merge`]**: union of several datasets with conflict detection,
//! - **[`retrieval`]**: top-k image pairs from global features,
//! - **[`eval`]**: accuracy of an estimated trajectory against ground truth,
//! - **[`workflow`]**: dataset-level helpers returning `anyhow` errors,
//! - **[`prelude`]**: convenient re-exports.
//!
//! ```
//! use kapture::prelude::*;
//! use kapture::core::synthetic::scene::{self, SceneSpec};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut mapping = scene::dataset(&SceneSpec::new("mapping", &["cam0"], 0..8))?;
//! scene::add_random_global_features(&mut mapping, 16, 1)?;
//! let mut query = scene::dataset(&SceneSpec::new("query", &["cam1"], 0..3))?;
//! scene::add_random_global_features(&mut query, 16, 2)?;
//!
//! let pairs = workflow::pairs_from_datasets(&mapping, Some(&query), &PairingOptions::with_top_k(2))?;
//! assert_eq!(pairs.len(), 6);
//!
//! let merged = workflow::merge_datasets(
//!     &[&mapping, &query],
//!     &MergeOptions::excluding([EntityKind::GlobalFeatures]),
//! )?;
//! assert_eq!(merged.records_camera().len(), 11);
//!
//! let report = workflow::evaluate_datasets(&merged, &merged, &EvaluationOptions::default())?;
//! assert_eq!(report.position_found_rate, 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Stability
//!
//! The `kapture` crate is the public compatibility boundary. Lower-level
//! crates may evolve more quickly.

pub mod workflow;

/// Dataset model, pose math and synthetic data helpers.
pub mod core {
    pub use kapture_core::*;
}

/// Dataset merging.
pub mod merge {
    pub use kapture_merge::*;
}

/// Image-pair retrieval from global features.
pub mod retrieval {
    pub use kapture_retrieval::*;
}

/// Localization accuracy evaluation.
pub mod eval {
    pub use kapture_eval::*;
}

/// Convenient re-exports for common use cases.
///
/// Import with `use kapture::prelude::*;`.
pub mod prelude {
    pub use crate::core::{
        AdapterOptions, CameraModel, CameraParams, Dataset, EntityKind, FeatureArray,
        FeatureType, Match, Observation, Point3d, Pose, PoseConvention, RecordKey, Rig, Sensor,
        SensorKind, Trajectory,
    };
    pub use crate::eval::{evaluate, Bin, EvaluationOptions, Report};
    pub use crate::merge::{merge, MergeOptions};
    pub use crate::retrieval::{generate_pairs, ImagePairScore, PairingOptions, SimilarityMetric};
    pub use crate::workflow;
}
