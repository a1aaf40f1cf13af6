//! Error types surfaced by the analysis engine
//!
//! Structural failures (bad archive, not enough sensors, degenerate
//! orientation) propagate as typed errors so callers can tell them apart.
//! Row- and frame-level anomalies never reach this layer; they are dropped
//! and counted in `RunStats`.

use thiserror::Error;

/// Archive bytes could not be turned into sensor file text
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("invalid zip archive: {0}")]
    Invalid(#[from] zip::result::ZipError),

    #[error("failed to read archive entry {name}: {source}")]
    Entry {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("archive entry {name} is too large: {size} bytes (limit {limit})")]
    EntryTooLarge { name: String, size: u64, limit: u64 },

    #[error("invalid base64 archive payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Fatal errors for a single analysis run
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("insufficient sensor data: found {found} usable sensor stream(s), need at least 2")]
    InsufficientSensorData { found: usize },

    #[error(
        "degenerate orientation in {file} at frame {frame}: quaternion magnitude {magnitude:e}"
    )]
    DegenerateOrientation { file: String, frame: usize, magnitude: f64 },
}

/// Exercise selector string that does not name a supported exercise
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized exercise type {0:?} (expected \"Squat\" or \"Leg Knee Extension\")")]
pub struct UnknownExercise(pub String);
