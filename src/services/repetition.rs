//! Repetition detector - exercise-specific extrema with debounce
//!
//! Each exercise resolves to a `RepetitionStrategy`: squats count valleys
//! below a fixed angle, knee extensions count peaks above an adaptive
//! threshold placed between the series minimum and maximum. Adding an
//! exercise means adding a strategy mapping, not another string branch.

use crate::domain::analysis::RepetitionEvent;
use crate::domain::types::ExerciseType;

/// Squat valleys must dip below this joint angle (degrees)
pub const SQUAT_THRESHOLD_DEG: f64 = 100.0;

/// Fraction of the observed range a knee-extension peak must clear
pub const EXTENSION_PEAK_FRACTION: f64 = 0.8;

/// Minimum frame separation between accepted repetitions
pub const MIN_FRAME_DISTANCE: usize = 20;

/// Which extremum counts as a repetition, and how its threshold is chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepetitionStrategy {
    /// Local minimum strictly below a fixed threshold
    Valley { threshold: f64 },
    /// Local maximum strictly above `min + fraction * (max - min)`
    Peak { fraction: f64 },
}

/// Detector parameters, normally taken from `[repetition]` config
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepetitionParams {
    pub squat_threshold_deg: f64,
    pub extension_peak_fraction: f64,
    pub min_frame_distance: usize,
}

impl Default for RepetitionParams {
    fn default() -> Self {
        Self {
            squat_threshold_deg: SQUAT_THRESHOLD_DEG,
            extension_peak_fraction: EXTENSION_PEAK_FRACTION,
            min_frame_distance: MIN_FRAME_DISTANCE,
        }
    }
}

impl RepetitionParams {
    /// Strategy for an exercise
    pub fn strategy_for(&self, exercise: ExerciseType) -> RepetitionStrategy {
        match exercise {
            ExerciseType::Squat => {
                RepetitionStrategy::Valley { threshold: self.squat_threshold_deg }
            }
            ExerciseType::LegKneeExtension => {
                RepetitionStrategy::Peak { fraction: self.extension_peak_fraction }
            }
        }
    }
}

/// Scan an angle series for repetitions. Stateless: the same input always
/// yields the same events.
pub fn detect_repetitions(
    angles: &[f64],
    strategy: RepetitionStrategy,
    min_frame_distance: usize,
) -> Vec<RepetitionEvent> {
    if angles.len() < 3 {
        return Vec::new();
    }

    let is_candidate: Box<dyn Fn(f64, f64, f64) -> bool> = match strategy {
        RepetitionStrategy::Valley { threshold } => {
            Box::new(move |prev, cur, next| cur < prev && cur <= next && cur < threshold)
        }
        RepetitionStrategy::Peak { fraction } => {
            let (min, max) = min_max(angles);
            let threshold = min + fraction * (max - min);
            Box::new(move |prev, cur, next| cur > prev && cur >= next && cur > threshold)
        }
    };

    let mut events: Vec<RepetitionEvent> = Vec::new();
    for (offset, window) in angles.windows(3).enumerate() {
        let frame = offset + 1;
        if !is_candidate(window[0], window[1], window[2]) {
            continue;
        }
        let debounced = events.last().is_some_and(|last| frame - last.frame < min_frame_distance);
        if !debounced {
            events.push(RepetitionEvent { frame, angle: window[1] });
        }
    }

    events
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
