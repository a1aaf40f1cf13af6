//! Per-run data quality counters
//!
//! Row- and frame-level anomalies are recovered locally (dropped rows,
//! identity orientations, out-of-range angles). These counters make that
//! silent degradation visible in logs and egress records.

use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Counters for one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    /// `.csv`/`.txt` entries found in the archive
    pub files_read: usize,
    /// Files that produced no samples
    pub empty_files: usize,
    pub rows_parsed: usize,
    /// Rows dropped for having too few populated values
    pub rows_skipped: usize,
    /// Frames considered: min(len1, len2)
    pub frames_aligned: usize,
    /// Frames whose joint angle fell outside [0, 180]
    pub frames_dropped: usize,
    /// Samples without orientation fields that used identity
    pub identity_fallbacks: usize,
    /// Zero-magnitude quaternions replaced by identity
    pub degenerate_substitutions: usize,
    pub repetitions: usize,
    /// Engine time, excluding archive I/O by the caller
    pub elapsed_us: u64,
}

impl RunStats {
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    }

    /// Share of aligned frames that made it into the angle series
    pub fn retained_ratio(&self) -> f64 {
        if self.frames_aligned == 0 {
            return 0.0;
        }
        (self.frames_aligned - self.frames_dropped) as f64 / self.frames_aligned as f64
    }

    /// Log the run summary
    pub fn log(&self) {
        info!(
            files_read = %self.files_read,
            empty_files = %self.empty_files,
            rows_parsed = %self.rows_parsed,
            rows_skipped = %self.rows_skipped,
            frames_aligned = %self.frames_aligned,
            frames_dropped = %self.frames_dropped,
            retained = format!("{:.3}", self.retained_ratio()),
            identity_fallbacks = %self.identity_fallbacks,
            degenerate_substitutions = %self.degenerate_substitutions,
            repetitions = %self.repetitions,
            elapsed_us = %self.elapsed_us,
            "run_stats"
        );
    }
}
