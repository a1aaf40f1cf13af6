//! Analysis egress - appends analysis records to file
//!
//! Records are written in JSONL format (one JSON object per line)
//! to the file specified in config.

use crate::domain::analysis::AnalysisResult;
use crate::infra::run_stats::RunStats;
use crate::services::analyzer::Analysis;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info};
use uuid::Uuid;

/// One egress line: provenance plus the full result
#[derive(Debug, Serialize)]
pub struct AnalysisRecord<'a> {
    /// UUIDv7 (time-sortable)
    pub id: String,
    /// RFC 3339 UTC
    pub analyzed_at: String,
    pub archive: &'a str,
    pub proximal: &'a str,
    pub distal: &'a str,
    pub stats: &'a RunStats,
    pub result: &'a AnalysisResult,
}

impl<'a> AnalysisRecord<'a> {
    pub fn new(archive: &'a str, analysis: &'a Analysis) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            analyzed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            archive,
            proximal: &analysis.proximal,
            distal: &analysis.distal,
            stats: &analysis.stats,
            result: &analysis.result,
        }
    }
}

/// Egress writer for analysis records
pub struct Egress {
    file_path: String,
}

impl Egress {
    pub fn new(file_path: &str) -> Self {
        info!(file_path = %file_path, "egress_initialized");
        Self { file_path: file_path.to_string() }
    }

    /// Write an analysis to the egress file
    /// Returns true if successful, false otherwise
    pub fn write_analysis(&self, archive: &str, analysis: &Analysis) -> bool {
        let record = AnalysisRecord::new(archive, analysis);
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                error!(archive = %archive, error = %e, "analysis_serialize_failed");
                return false;
            }
        };

        match self.append_line(&json) {
            Ok(()) => {
                info!(
                    id = %record.id,
                    archive = %archive,
                    exercise = %analysis.result.exercise_type,
                    repetitions = %analysis.result.metrics.repetition_count,
                    "analysis_egressed"
                );
                true
            }
            Err(e) => {
                error!(
                    archive = %archive,
                    error = %e,
                    "analysis_egress_failed"
                );
                false
            }
        }
    }

    /// Append a line to the egress file
    fn append_line(&self, line: &str) -> std::io::Result<()> {
        let path = Path::new(&self.file_path);

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        writeln!(file, "{}", line)?;
        debug!(file = %self.file_path, bytes = %line.len(), "egress_written");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::Metrics;
    use crate::domain::types::{ExerciseType, Side};
    use std::fs;
    use tempfile::tempdir;

    fn sample_analysis() -> Analysis {
        Analysis {
            result: AnalysisResult {
                exercise_type: ExerciseType::Squat,
                joint_angles: vec![180.0, 180.0],
                repetitions: Vec::new(),
                metrics: Metrics::empty(Side::Left),
            },
            proximal: "a_thigh.csv".to_string(),
            distal: "b_shin.csv".to_string(),
            stats: RunStats { files_read: 2, rows_parsed: 4, ..Default::default() },
        }
    }

    #[test]
    fn test_egress_new() {
        let egress = Egress::new("test.jsonl");
        assert_eq!(egress.file_path, "test.jsonl");
    }

    #[test]
    fn test_write_analysis() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nested").join("analyses.jsonl");
        let egress = Egress::new(file_path.to_str().unwrap());

        assert!(egress.write_analysis("session1.zip", &sample_analysis()));
        assert!(egress.write_analysis("session2.zip", &sample_analysis()));

        let content = fs::read_to_string(&file_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(content.ends_with('\n'));

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["archive"], "session1.zip");
        assert_eq!(parsed["proximal"], "a_thigh.csv");
        assert_eq!(parsed["stats"]["rows_parsed"], 4);
        assert_eq!(parsed["result"]["exerciseType"], "Squat");
        assert_eq!(parsed["id"].as_str().unwrap().len(), 36);
    }
}
