//! Orientation normalizer - one canonical unit quaternion per sample
//!
//! Priority: quaternion fields, then Euler fields (degrees, intrinsic
//! Z-Y-X), then identity. Identity for a sample without orientation data is
//! a known precision loss; callers count it.

use crate::domain::quaternion::Quaternion;
use crate::domain::types::{Sample, EULER_X, EULER_Y, EULER_Z, QUAT_W, QUAT_X, QUAT_Y, QUAT_Z};
use serde::Deserialize;

/// Quaternions shorter than this cannot be normalized meaningfully
pub const DEGENERATE_MAGNITUDE: f64 = 1e-9;

const AXIS_X: [f64; 3] = [1.0, 0.0, 0.0];
const AXIS_Y: [f64; 3] = [0.0, 1.0, 0.0];
const AXIS_Z: [f64; 3] = [0.0, 0.0, 1.0];

/// What to do with a zero-magnitude quaternion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Abort the analysis with `DegenerateOrientation`
    #[default]
    Fail,
    /// Substitute the identity rotation and keep going
    Identity,
}

/// Where a sample's orientation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationSource {
    Quaternion,
    Euler,
    /// No orientation fields present
    Missing,
    /// Zero-magnitude quaternion replaced under `DegeneratePolicy::Identity`
    DegenerateSubstituted,
}

/// A normalized orientation and its provenance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub rotation: Quaternion,
    pub source: OrientationSource,
}

/// Zero-magnitude quaternion rejected under `DegeneratePolicy::Fail`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegenerateQuaternion {
    pub magnitude: f64,
}

/// Normalize a raw quaternion, rejecting ones too short to normalize
pub fn normalize_quaternion(q: Quaternion) -> Result<Quaternion, DegenerateQuaternion> {
    let magnitude = q.magnitude();
    if magnitude.is_nan() || magnitude < DEGENERATE_MAGNITUDE {
        return Err(DegenerateQuaternion { magnitude });
    }
    Ok(q.normalized())
}

/// Intrinsic Z-Y-X Euler angles (degrees) to a unit quaternion
pub fn euler_zyx_to_quaternion(x_deg: f64, y_deg: f64, z_deg: f64) -> Quaternion {
    let qx = Quaternion::from_axis_angle(AXIS_X, x_deg.to_radians());
    let qy = Quaternion::from_axis_angle(AXIS_Y, y_deg.to_radians());
    let qz = Quaternion::from_axis_angle(AXIS_Z, z_deg.to_radians());
    qz.multiply(&qy).multiply(&qx)
}

/// Resolve a sample to a unit orientation
pub fn orientation_of(
    sample: &Sample,
    policy: DegeneratePolicy,
) -> Result<Orientation, DegenerateQuaternion> {
    if let (Some(w), Some(x), Some(y), Some(z)) = (
        sample.number(QUAT_W),
        sample.number(QUAT_X),
        sample.number(QUAT_Y),
        sample.number(QUAT_Z),
    ) {
        return match normalize_quaternion(Quaternion::new(w, x, y, z)) {
            Ok(rotation) => Ok(Orientation { rotation, source: OrientationSource::Quaternion }),
            Err(_) if policy == DegeneratePolicy::Identity => Ok(Orientation {
                rotation: Quaternion::IDENTITY,
                source: OrientationSource::DegenerateSubstituted,
            }),
            Err(e) => Err(e),
        };
    }

    if let (Some(x), Some(y), Some(z)) =
        (sample.number(EULER_X), sample.number(EULER_Y), sample.number(EULER_Z))
    {
        return Ok(Orientation {
            rotation: euler_zyx_to_quaternion(x, y, z),
            source: OrientationSource::Euler,
        });
    }

    Ok(Orientation { rotation: Quaternion::IDENTITY, source: OrientationSource::Missing })
}
