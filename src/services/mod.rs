//! Services - the analysis pipeline stages
//!
//! This module contains the core analysis logic:
//! - `orientation` - Sample to unit quaternion
//! - `joint_angle` - Two segment streams to a joint-angle series
//! - `repetition` - Exercise-specific extremum detection with debounce
//! - `load_estimator` - Left/right weight-distribution heuristics
//! - `aggregator` - ROM statistics and result assembly
//! - `analyzer` - Pipeline composition root

pub mod aggregator;
pub mod analyzer;
pub mod joint_angle;
pub mod load_estimator;
pub mod orientation;
pub mod repetition;

// Re-export commonly used types
pub use analyzer::{Analysis, MovementAnalyzer};
pub use joint_angle::AngleMethod;
pub use load_estimator::{EulerLoadProxy, LoadEstimator, TIE_BREAK_SIDE};
pub use orientation::DegeneratePolicy;
pub use repetition::{RepetitionParams, RepetitionStrategy};
