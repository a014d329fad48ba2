//! Seeded pose perturbations of exact magnitude.
//!
//! Directions come from a SplitMix64 stream keyed by `(seed, index)`, not
//! from a `rand` generator, so a perturbed trajectory is reproducible on
//! every platform and `rand` release.

use crate::{Pose, Quat, Real, Vec3};

/// Perturbation of exactly `translation` (length units) and `rotation_deg`
/// (degrees), in a pseudo-random direction chosen per `(seed, index)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseNoise {
    /// Base seed controlling the pseudo-random directions.
    pub seed: u64,
    /// Length of the translation offset.
    pub translation: Real,
    /// Angle of the rotation offset, in degrees.
    pub rotation_deg: Real,
}

impl Default for PoseNoise {
    fn default() -> Self {
        Self {
            seed: 0,
            translation: 0.0,
            rotation_deg: 0.0,
        }
    }
}

impl PoseNoise {
    /// Unit direction for sample `index` and stream `stream`.
    fn direction(&self, index: usize, stream: u64) -> Vec3 {
        let key = mix_key(self.seed ^ stream, index);
        let u = u64_to_unit_f64(splitmix64(key));
        let v = u64_to_unit_f64(splitmix64(key ^ 0x94D0_49BB_1331_11EB));
        // Uniform on the sphere.
        let z = 2.0 * u - 1.0;
        let phi = 2.0 * std::f64::consts::PI * v;
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * phi.cos(), r * phi.sin(), z)
    }

    /// Offset the device position by `translation` and the orientation by
    /// `rotation_deg`. Absent parts stay absent.
    ///
    /// The translation offset is applied to [`Pose::translation`] directly.
    pub fn apply(&self, index: usize, pose: &Pose) -> Pose {
        let rotation = pose.rotation.map(|r| {
            if self.rotation_deg == 0.0 {
                return r;
            }
            let axis = nalgebra::Unit::new_normalize(self.direction(index, 0x5EED_0001));
            Quat::from_axis_angle(&axis, self.rotation_deg.to_radians()) * r
        });
        let translation = pose
            .translation
            .map(|t| t + self.direction(index, 0x5EED_0002) * self.translation);
        Pose {
            rotation,
            translation,
        }
    }
}

#[inline]
fn mix_key(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
fn u64_to_unit_f64(x: u64) -> Real {
    // 53 high bits -> [0, 1)
    let mantissa = x >> 11;
    (mantissa as Real) * (1.0 / ((1u64 << 53) as Real))
}
