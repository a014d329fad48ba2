//! Merging of kapture datasets.
//!
//! [`merge`] builds the union of several [`Dataset`](kapture_core::Dataset)
//! values. Entries present in more than one input must be identical (exact
//! comparison, floating-point fields included) or the merge fails with a
//! [`MergeConflictError`]. Whole entity kinds can be dropped with
//! [`MergeOptions::excluded`].
//!
//! ```
//! use kapture_core::synthetic::scene::{self, SceneSpec};
//! use kapture_core::EntityKind;
//! use kapture_merge::{merge, MergeOptions};
//!
//! let a = scene::dataset(&SceneSpec::new("a", &["cam0"], 0..3)).unwrap();
//! let b = scene::dataset(&SceneSpec::new("b", &["cam1"], 0..2)).unwrap();
//!
//! let all = merge(&[&a, &b], &MergeOptions::default()).unwrap();
//! assert_eq!(all.records_camera().len(), 5);
//!
//! let no_poses = merge(&[&a, &b], &MergeOptions::excluding([EntityKind::Trajectories])).unwrap();
//! assert!(no_poses.trajectory().is_empty());
//! ```

mod error;
mod merge;

pub use error::*;
pub use merge::*;
