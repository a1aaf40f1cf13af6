//! Metrics aggregator - ROM statistics, repetition count, weight estimate

use crate::domain::analysis::{AnalysisResult, Metrics, RepetitionEvent, RomStats};
use crate::domain::types::{ExerciseType, Side};
use crate::services::load_estimator::LoadEstimator;
use tracing::warn;

/// ROM summary; `None` for an empty series
pub fn rom_stats(angles: &[f64]) -> Option<RomStats> {
    if angles.is_empty() {
        return None;
    }

    let (min, max, sum) = angles
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY, 0.0), |(lo, hi, sum), &a| {
            (lo.min(a), hi.max(a), sum + a)
        });

    Some(RomStats { min, max, mean: sum / angles.len() as f64, range: max - min })
}

/// Build the metrics record. An empty series yields zero-filled metrics.
pub fn aggregate_metrics(
    angles: &[f64],
    events: &[RepetitionEvent],
    load: &dyn LoadEstimator,
    tie_side: Side,
) -> Metrics {
    let Some(rom) = rom_stats(angles) else {
        warn!(estimator = load.name(), "no_usable_frames");
        return Metrics::empty(tie_side);
    };

    Metrics {
        repetition_count: events.len(),
        max_flexion_angle: rom.min,
        max_extension_angle: rom.max,
        rom,
        weight_distribution: load.distribution(tie_side),
    }
}

/// Assemble the immutable result handed to presentation layers
pub fn assemble_result(
    exercise_type: ExerciseType,
    angles: Vec<f64>,
    events: Vec<RepetitionEvent>,
    load: &dyn LoadEstimator,
    tie_side: Side,
) -> AnalysisResult {
    let metrics = aggregate_metrics(&angles, &events, load, tie_side);
    AnalysisResult { exercise_type, joint_angles: angles, repetitions: events, metrics }
}
