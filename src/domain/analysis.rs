//! Analysis result model handed to presentation layers
//!
//! Serialized field names are camelCase because the charting and report
//! consumers read them as a flat JSON record.

use crate::domain::types::{ExerciseType, Side};
use serde::{Deserialize, Serialize};

/// A detected repetition extremum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepetitionEvent {
    /// Index into the joint-angle series
    pub frame: usize,
    /// Joint angle at the extremum (degrees)
    pub angle: f64,
}

/// Range-of-motion summary over the joint-angle series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RomStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub range: f64,
}

/// Heuristic left/right loading estimate. Not a force measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightDistribution {
    pub dominant_side: Side,
    pub left_percent: f64,
    pub right_percent: f64,
}

impl WeightDistribution {
    /// Zero-filled record for analyses without usable frames
    pub fn zeroed(tie_side: Side) -> Self {
        Self { dominant_side: tie_side, left_percent: 0.0, right_percent: 0.0 }
    }
}

/// Exercise metrics derived from one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub repetition_count: usize,
    /// Smallest joint angle observed (deepest flexion)
    pub max_flexion_angle: f64,
    /// Largest joint angle observed
    pub max_extension_angle: f64,
    pub rom: RomStats,
    pub weight_distribution: WeightDistribution,
}

impl Metrics {
    /// Metrics for a series with no usable frames
    pub fn empty(tie_side: Side) -> Self {
        Self {
            repetition_count: 0,
            max_flexion_angle: 0.0,
            max_extension_angle: 0.0,
            rom: RomStats::default(),
            weight_distribution: WeightDistribution::zeroed(tie_side),
        }
    }
}

/// Complete, immutable output of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub exercise_type: ExerciseType,
    pub joint_angles: Vec<f64>,
    pub repetitions: Vec<RepetitionEvent>,
    pub metrics: Metrics,
}

impl AnalysisResult {
    /// Serialize to a single-line JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
