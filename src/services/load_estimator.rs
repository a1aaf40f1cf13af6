//! Left/right weight-distribution estimators
//!
//! `EulerLoadProxy` is a coarse heuristic: it treats the magnitude of the
//! pitch (`Euler_Y`) and yaw (`Euler_Z`) readings as stand-ins for left and
//! right loading. It is not a force measurement. A force-plate estimator can
//! replace it by implementing `LoadEstimator`.

use crate::domain::analysis::WeightDistribution;
use crate::domain::types::{Sample, Side, EULER_Y, EULER_Z};

/// Side reported when both percentages are equal.
///
/// The clinical intent of a tie is undefined; left is kept so existing
/// reports stay comparable. Overridable through `[weight] tie_side`.
pub const TIE_BREAK_SIDE: Side = Side::Left;

/// Accumulates per-frame load evidence and turns it into a distribution
pub trait LoadEstimator: Send {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Called once per aligned frame with the proximal and distal samples
    fn observe(&mut self, proximal: &Sample, distal: &Sample);

    fn distribution(&self, tie_side: Side) -> WeightDistribution;
}

/// Heuristic estimator built from absolute Euler Y/Z readings
#[derive(Debug, Clone, Default)]
pub struct EulerLoadProxy {
    left_sum: f64,
    right_sum: f64,
    frames: usize,
}

impl EulerLoadProxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl LoadEstimator for EulerLoadProxy {
    fn name(&self) -> &'static str {
        "euler_proxy"
    }

    fn observe(&mut self, proximal: &Sample, distal: &Sample) {
        let abs_or_zero = |sample: &Sample, field: &str| sample.number(field).unwrap_or(0.0).abs();

        // Mean of the two segments for this frame
        self.left_sum += (abs_or_zero(proximal, EULER_Y) + abs_or_zero(distal, EULER_Y)) / 2.0;
        self.right_sum += (abs_or_zero(proximal, EULER_Z) + abs_or_zero(distal, EULER_Z)) / 2.0;
        self.frames += 1;
    }

    fn distribution(&self, tie_side: Side) -> WeightDistribution {
        if self.frames == 0 {
            return WeightDistribution::zeroed(tie_side);
        }

        let left = self.left_sum / self.frames as f64;
        let right = self.right_sum / self.frames as f64;
        let total = left + right;

        let (left_percent, right_percent) =
            if total > 0.0 { (left / total * 100.0, right / total * 100.0) } else { (50.0, 50.0) };

        let dominant_side = if left_percent > right_percent {
            Side::Left
        } else if right_percent > left_percent {
            Side::Right
        } else {
            tie_side
        };

        WeightDistribution { dominant_side, left_percent, right_percent }
    }
}
