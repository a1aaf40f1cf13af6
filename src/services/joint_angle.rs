//! Joint angle calculator - two segment streams to one angle series
//!
//! Frames are aligned by index and truncated to the shorter stream. An angle
//! outside [0, 180] (or NaN) drops its frame; nothing is clamped or
//! interpolated. Every aligned frame is also fed to the load estimator.

use crate::domain::quaternion::{dot, length, Quaternion};
use crate::domain::types::SensorFile;
use crate::error::AnalysisError;
use crate::services::load_estimator::LoadEstimator;
use crate::services::orientation::{orientation_of, DegeneratePolicy, OrientationSource};
use serde::Deserialize;
use tracing::debug;

/// Segment-local "up" axis
pub const REFERENCE_AXIS: [f64; 3] = [0.0, 1.0, 0.0];

/// Vectors shorter than this have no meaningful direction
const MIN_VECTOR_LENGTH: f64 = 1e-12;

/// How the angle between two segments is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleMethod {
    /// 180 minus the angle between the rotated reference axes
    #[default]
    ReferenceAxis,
    /// 180 minus the rotation angle of the relative quaternion q1^-1 * q2
    RelativeRotation,
}

/// Joint-angle series plus per-frame bookkeeping
#[derive(Debug, Clone, Default)]
pub struct JointAngleSeries {
    pub angles: Vec<f64>,
    /// Frames considered: min(len1, len2)
    pub aligned_frames: usize,
    /// Frames whose angle fell outside [0, 180]
    pub dropped_frames: usize,
    /// Samples without orientation fields (identity used)
    pub identity_fallbacks: usize,
    /// Zero-magnitude quaternions replaced by identity
    pub degenerate_substitutions: usize,
}

impl JointAngleSeries {
    /// Keep a finite angle within [0, 180], otherwise count the frame as dropped
    pub fn record(&mut self, frame: usize, angle: Option<f64>) {
        match angle {
            Some(angle) if in_range(angle) => self.angles.push(angle),
            other => {
                self.dropped_frames += 1;
                debug!(frame = frame, angle = ?other, "joint_angle_dropped");
            }
        }
    }
}

/// Angle between two vectors in degrees, `None` if either has no direction
pub fn angle_between_deg(a: [f64; 3], b: [f64; 3]) -> Option<f64> {
    let denominator = length(a) * length(b);
    if denominator < MIN_VECTOR_LENGTH {
        return None;
    }
    let cosine = (dot(a, b) / denominator).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}

/// Joint angle for one pair of unit orientations.
/// 180 means fully extended (segments aligned).
pub fn joint_angle(q1: &Quaternion, q2: &Quaternion, method: AngleMethod) -> Option<f64> {
    match method {
        AngleMethod::ReferenceAxis => {
            let v1 = q1.rotate_vector(REFERENCE_AXIS);
            let v2 = q2.rotate_vector(REFERENCE_AXIS);
            angle_between_deg(v1, v2).map(|between| 180.0 - between)
        }
        AngleMethod::RelativeRotation => {
            let relative = q1.conjugate().multiply(q2);
            Some(180.0 - relative.rotation_angle_deg())
        }
    }
}

#[inline]
fn in_range(angle: f64) -> bool {
    (0.0..=180.0).contains(&angle)
}

/// Compute the joint-angle series for a proximal/distal pair.
///
/// Orientations are normalized before measuring, so the drop path in
/// `JointAngleSeries::record` is a guard against numeric failure rather than
/// a normal outcome.
pub fn compute_joint_angles(
    proximal: &SensorFile,
    distal: &SensorFile,
    method: AngleMethod,
    policy: DegeneratePolicy,
    load: &mut dyn LoadEstimator,
) -> Result<JointAngleSeries, AnalysisError> {
    let aligned_frames = proximal.len().min(distal.len());
    let mut series = JointAngleSeries {
        angles: Vec::with_capacity(aligned_frames),
        aligned_frames,
        ..Default::default()
    };

    for (frame, (s1, s2)) in proximal.samples.iter().zip(distal.samples.iter()).enumerate() {
        load.observe(s1, s2);

        let o1 = orientation_of(s1, policy).map_err(|e| AnalysisError::DegenerateOrientation {
            file: proximal.name.clone(),
            frame,
            magnitude: e.magnitude,
        })?;
        let o2 = orientation_of(s2, policy).map_err(|e| AnalysisError::DegenerateOrientation {
            file: distal.name.clone(),
            frame,
            magnitude: e.magnitude,
        })?;

        for source in [o1.source, o2.source] {
            match source {
                OrientationSource::Missing => series.identity_fallbacks += 1,
                OrientationSource::DegenerateSubstituted => series.degenerate_substitutions += 1,
                OrientationSource::Quaternion | OrientationSource::Euler => {}
            }
        }

        series.record(frame, joint_angle(&o1.rotation, &o2.rotation, method));
    }

    debug!(
        aligned_frames = series.aligned_frames,
        retained = series.angles.len(),
        dropped = series.dropped_frames,
        identity_fallbacks = series.identity_fallbacks,
        "joint_angles_computed"
    );

    Ok(series)
}
