//! Rigid poses whose rotation and translation are independently optional.

use serde::{Deserialize, Serialize};

use crate::{iso3_from_parts, Iso3, Quat, Vec3};

/// Which way the poses of a dataset map points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseConvention {
    /// `p_device = R * p_world + t` (camera extrinsics).
    #[default]
    WorldToDevice,
    /// `p_world = R * p_device + t` (device pose in the world).
    DeviceToWorld,
}

/// A rigid transform with optional parts.
///
/// A missing rotation or translation means "not estimated"; it is never
/// replaced by identity or zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Quat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vec3>,
}

impl Pose {
    pub fn new(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation: Some(rotation),
            translation: Some(translation),
        }
    }

    pub fn identity() -> Self {
        Self::new(Quat::identity(), Vec3::zeros())
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation: Some(rotation),
            translation: None,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            rotation: None,
            translation: Some(translation),
        }
    }

    pub fn from_iso3(iso: &Iso3) -> Self {
        Self::new(iso.rotation, iso.translation.vector)
    }

    /// Both rotation and translation are present.
    pub fn is_complete(&self) -> bool {
        self.rotation.is_some() && self.translation.is_some()
    }

    /// Neither rotation nor translation is present.
    pub fn is_empty(&self) -> bool {
        self.rotation.is_none() && self.translation.is_none()
    }

    /// Every present component is finite.
    pub fn is_finite(&self) -> bool {
        self.rotation
            .map_or(true, |q| q.coords.iter().all(|v| v.is_finite()))
            && self
                .translation
                .map_or(true, |t| t.iter().all(|v| v.is_finite()))
    }

    pub fn to_iso3(&self) -> Option<Iso3> {
        Some(iso3_from_parts(self.rotation?, self.translation?))
    }

    /// Inverse transform; only defined for complete poses.
    pub fn inverse(&self) -> Option<Pose> {
        self.to_iso3().map(|iso| Pose::from_iso3(&iso.inverse()))
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &Pose) -> Option<Pose> {
        Some(Pose::from_iso3(&(self.to_iso3()? * other.to_iso3()?)))
    }

    /// Position of the device in the world frame, under `convention`.
    ///
    /// World-to-device poses need the rotation to recover the position.
    pub fn device_position(&self, convention: PoseConvention) -> Option<Vec3> {
        match convention {
            PoseConvention::DeviceToWorld => self.translation,
            PoseConvention::WorldToDevice => {
                let r = self.rotation?;
                let t = self.translation?;
                Some(-(r.inverse() * t))
            }
        }
    }
}
