//! Mathematical type aliases and small rotation helpers.
//!
//! All geometry in the dataset model is expressed with these aliases so that
//! the scalar type can be changed in one place.

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// Unit quaternion with [`Real`] components.
pub type Quat = UnitQuaternion<Real>;
/// 3D rigid transform (SE(3)) using [`Real`].
pub type Iso3 = Isometry3<Real>;

/// Build an [`Iso3`] from a rotation and a translation.
pub fn iso3_from_parts(rotation: Quat, translation: Vec3) -> Iso3 {
    Isometry3::from_parts(Translation3::from(translation), rotation)
}

/// Angle of the relative rotation between `a` and `b`, in radians.
///
/// The result lies in `[0, π]` and is symmetric in its arguments; `q` and
/// `-q` describe the same rotation and yield the same angle.
pub fn relative_rotation_angle(a: &Quat, b: &Quat) -> Real {
    // atan2 keeps full precision for small angles, where acos(w) does not.
    let rel = a.inverse() * b;
    let q = rel.quaternion();
    2.0 * q.imag().norm().atan2(q.w.abs())
}

/// Same as [`relative_rotation_angle`], in degrees.
pub fn relative_rotation_angle_deg(a: &Quat, b: &Quat) -> Real {
    relative_rotation_angle(a, b).to_degrees()
}
