//! Movement analysis engine library
//!
//! Turns archived two-sensor motion-capture exports into joint angles,
//! repetition counts, range-of-motion statistics and a weight-distribution
//! estimate.

pub mod domain;
pub mod error;
pub mod infra;
pub mod io;
pub mod services;

pub use error::{AnalysisError, ArchiveError, UnknownExercise};
