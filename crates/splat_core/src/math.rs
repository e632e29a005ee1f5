//! Small vector and rotation types used by the record layout.
//!
//! Both are `#[repr(C)]` and `Pod` so they can sit inside a [`crate::Record`]
//! and be uploaded to the GPU without conversion.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Position, velocity, scale or direction in world space.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X
    pub x: f32,
    /// Y, up
    pub y: f32,
    /// Z
    pub z: f32,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Up.
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);

    /// Builds a vector from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// All three components set to `v`.
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product, right-handed.
    #[inline]
    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Same direction at unit length. A zero vector stays zero.
    #[inline]
    #[must_use]
    pub fn normalize(self) -> Self {
        match self.length() {
            len if len > 0.0 => self * len.recip(),
            _ => Self::ZERO,
        }
    }

    /// Euclidean distance between two points.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Largest component, used as a record's size.
    #[inline]
    #[must_use]
    pub fn max_element(self) -> f32 {
        self.x.max(self.y).max(self.z)
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Rotation quaternion. Only used to derive the render covariance at
/// record creation.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Quaternion {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// W component
    pub w: f32,
}

impl Quaternion {
    /// Creates a new quaternion
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Identity rotation
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Rotation of `angle` radians around a unit `axis`.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Column-major 3x3 rotation matrix.
    ///
    /// `m[0..3]` is the first column, `m[3..6]` the second, `m[6..9]` the third.
    #[must_use]
    pub fn to_mat3(self) -> [f32; 9] {
        let Self { x, y, z, w } = self;
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, yx, yy) = (x * x2, y * x2, y * y2);
        let (zx, zy, zz) = (z * x2, z * y2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);

        [
            1.0 - yy - zz,
            yx + wz,
            zx - wy,
            yx - wz,
            1.0 - xx - zz,
            zy + wx,
            zx + wy,
            zy - wx,
            1.0 - xx - yy,
        ]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_is_orthogonal() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-2.0, 0.5, 4.0);
        let c = a.cross(b);
        assert!(c.dot(a).abs() < 1e-5);
        assert!(c.dot(b).abs() < 1e-5);
    }

    #[test]
    fn test_normalize() {
        let n = Vec3::new(3.0, 0.0, -4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n.z + 0.8).abs() < 1e-6);
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }

    #[test]
    fn test_identity_matrix() {
        let m = Quaternion::IDENTITY.to_mat3();
        assert_eq!(m, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_quarter_turn_about_y() {
        let q = Quaternion::from_axis_angle(Vec3::Y, std::f32::consts::FRAC_PI_2);
        let m = q.to_mat3();
        // First column is the image of +X, which a quarter turn about Y sends to -Z.
        assert!(m[0].abs() < 1e-6);
        assert!((m[2] + 1.0).abs() < 1e-6);
    }
}
