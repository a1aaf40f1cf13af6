//! Domain models - sensor samples, orientations and analysis results
//!
//! This module contains the canonical data types used throughout the engine:
//! - `types` - `Sample`, `SensorFile`, `ExerciseType`, `Side`
//! - `quaternion` - orientation math
//! - `analysis` - `AnalysisResult`, `Metrics` and friends

pub mod analysis;
pub mod quaternion;
pub mod types;

// Re-export commonly used types at module level
pub use analysis::{AnalysisResult, Metrics, RepetitionEvent, RomStats, WeightDistribution};
pub use quaternion::Quaternion;
pub use types::{ExerciseType, FieldValue, Sample, SensorFile, Side};
