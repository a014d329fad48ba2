//! Canonical dataset model for visual-localization pipelines.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Quat`, `Iso3`, ...),
//! - sensors, rigs and per-timestamp records,
//! - sparse trajectories of partially-known poses,
//! - keypoints, descriptors, global features, matches and 3D points,
//! - the [`Dataset`] container, which validates every insertion.
//!
//! Datasets are independent values: there is no process-wide registry, and
//! several unrelated datasets may be built concurrently on different threads.
//!
//! # Example
//!
//! ```
//! use kapture_core::{
//!     CameraModel, CameraParams, Dataset, Pose, PoseConvention, RecordKey, Sensor, Vec3,
//! };
//!
//! let mut ds = Dataset::new(PoseConvention::WorldToDevice);
//! let cam = CameraParams {
//!     width: 640,
//!     height: 480,
//!     model: CameraModel::SimplePinhole { f: 500.0, cx: 320.0, cy: 240.0 },
//! };
//! ds.add_sensor("cam0", Sensor::camera(cam)).unwrap();
//! ds.add_camera_record(0, "cam0", "cam0/0000.jpg").unwrap();
//! ds.add_pose(RecordKey::new(0, "cam0"), Pose::from_translation(Vec3::x())).unwrap();
//!
//! assert!(ds.pose(0, "cam0").unwrap().rotation.is_none());
//! assert!(ds.add_pose(RecordKey::new(1, "cam0"), Pose::identity()).is_err());
//! ```

mod dataset;
mod error;
mod features;
mod kind;
/// Linear algebra type aliases and rotation helpers.
mod math;
mod matches;
/// Options for the boundary towards external tools.
mod options;
mod points;
mod pose;
mod records;
mod rigs;
mod sensors;
/// Deterministic synthetic data generation helpers.
///
/// Public so that workspace tests and examples can share it; not intended
/// for production use.
pub mod synthetic;
mod trajectory;

pub use dataset::*;
pub use error::*;
pub use features::*;
pub use kind::*;
pub use math::*;
pub use matches::*;
pub use options::*;
pub use points::*;
pub use pose::*;
pub use records::*;
pub use rigs::*;
pub use sensors::*;
pub use trajectory::*;
