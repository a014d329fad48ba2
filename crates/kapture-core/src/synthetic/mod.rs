//! Deterministic synthetic data generation helpers.
//!
//! Building blocks for small but complete captures used in tests, examples
//! and benchmarks:
//! - circular camera paths with ground-truth poses,
//! - grid keypoints and seeded global features,
//! - deterministic pose noise of exact magnitude.
//!
//! # Example
//!
//! ```
//! use kapture_core::synthetic::{scene, noise::PoseNoise};
//!
//! let spec = scene::SceneSpec::new("mapping", &["cam0"], 0..5);
//! let gt = scene::trajectory(&spec).unwrap();
//! let noise = PoseNoise { seed: 1, translation: 0.05, rotation_deg: 1.0 };
//! let (key, pose) = gt.iter().next().unwrap();
//! let noisy = noise.apply(0, pose);
//! assert_eq!(key.timestamp, 0);
//! assert!(noisy.is_complete());
//! ```

pub mod noise;
pub mod scene;
