//! Quaternion math for segment orientations
//!
//! Format: (w, x, y, z) where w is the scalar part. Only the handful of
//! operations the joint-angle pipeline needs are provided.

use serde::Serialize;

/// Rotation quaternion
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self { w: 1.0, x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `angle_rad` around a unit `axis`
    pub fn from_axis_angle(axis: [f64; 3], angle_rad: f64) -> Self {
        let half = angle_rad * 0.5;
        let s = half.sin();
        Self { w: half.cos(), x: axis[0] * s, y: axis[1] * s, z: axis[2] * s }
    }

    #[inline]
    pub fn magnitude(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit-length copy. Callers must check the magnitude first; a zero
    /// quaternion yields NaN components.
    pub fn normalized(&self) -> Self {
        let inv = 1.0 / self.magnitude();
        Self { w: self.w * inv, x: self.x * inv, y: self.y * inv, z: self.z * inv }
    }

    /// Conjugate (inverse for unit quaternions)
    pub fn conjugate(&self) -> Self {
        Self { w: self.w, x: -self.x, y: -self.y, z: -self.z }
    }

    /// Hamilton product: self * other
    pub fn multiply(&self, other: &Quaternion) -> Quaternion {
        Quaternion {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }

    /// Rotate a vector: q * v * q^*
    pub fn rotate_vector(&self, v: [f64; 3]) -> [f64; 3] {
        let v_quat = Quaternion { w: 0.0, x: v[0], y: v[1], z: v[2] };
        let rotated = self.multiply(&v_quat).multiply(&self.conjugate());
        [rotated.x, rotated.y, rotated.z]
    }

    /// Rotation angle of a unit quaternion in degrees, shortest arc [0, 180]
    pub fn rotation_angle_deg(&self) -> f64 {
        (2.0 * self.w.abs().min(1.0).acos()).to_degrees()
    }

    pub fn approx_eq(&self, other: &Quaternion, tolerance: f64) -> bool {
        (self.w - other.w).abs() <= tolerance
            && (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[inline]
pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn length(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}
