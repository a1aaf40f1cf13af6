//! Movement analyzer - the composition root of the analysis pipeline
//!
//! Archive → rows → orientations → joint angles → repetitions → metrics.
//! The analyzer holds configuration and the load estimator factory only;
//! every call builds fresh state, so one instance can serve many concurrent
//! analyses.

use crate::domain::analysis::AnalysisResult;
use crate::domain::types::{ExerciseType, SensorFile};
use crate::error::AnalysisError;
use crate::infra::config::Config;
use crate::infra::run_stats::RunStats;
use crate::io::archive::{read_archive, read_base64_archive};
use crate::io::row_parser::parse_rows;
use crate::services::aggregator::assemble_result;
use crate::services::joint_angle::compute_joint_angles;
use crate::services::load_estimator::{EulerLoadProxy, LoadEstimator};
use crate::services::repetition::detect_repetitions;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

type LoadEstimatorFactory = Arc<dyn Fn() -> Box<dyn LoadEstimator> + Send + Sync>;

/// Output of one analysis run
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: AnalysisResult,
    /// File assigned to the proximal segment (first by name)
    pub proximal: String,
    /// File assigned to the distal segment (second by name)
    pub distal: String,
    pub stats: RunStats,
}

/// Runs the movement analysis pipeline
#[derive(Clone)]
pub struct MovementAnalyzer {
    config: Config,
    load_estimator: LoadEstimatorFactory,
}

impl std::fmt::Debug for MovementAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovementAnalyzer").field("config", &self.config).finish_non_exhaustive()
    }
}

impl MovementAnalyzer {
    /// Analyzer with the heuristic Euler load proxy
    pub fn new(config: Config) -> Self {
        let load_estimator: LoadEstimatorFactory =
            Arc::new(|| Box::new(EulerLoadProxy::new()) as Box<dyn LoadEstimator>);
        Self { config, load_estimator }
    }

    /// Replace the weight-distribution estimator
    pub fn with_load_estimator<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn LoadEstimator> + Send + Sync + 'static,
    {
        self.load_estimator = Arc::new(factory);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze raw ZIP archive bytes
    pub fn analyze_archive(
        &self,
        bytes: &[u8],
        exercise: ExerciseType,
    ) -> Result<Analysis, AnalysisError> {
        let files = read_archive(bytes)?;
        self.analyze_files(&files, exercise)
    }

    /// Analyze a base64-encoded ZIP archive
    pub fn analyze_base64(
        &self,
        payload: &str,
        exercise: ExerciseType,
    ) -> Result<Analysis, AnalysisError> {
        let files = read_base64_archive(payload)?;
        self.analyze_files(&files, exercise)
    }

    /// Analyze already-extracted sensor files keyed by name.
    ///
    /// Segments are the first two files by name that parse to at least one
    /// sample. Files without samples are skipped and counted rather than
    /// taking a segment slot, so a stray empty export ahead of the sensor
    /// files does not fail the run.
    pub fn analyze_files(
        &self,
        files: &BTreeMap<String, String>,
        exercise: ExerciseType,
    ) -> Result<Analysis, AnalysisError> {
        let started = Instant::now();
        let mut stats = RunStats { files_read: files.len(), ..Default::default() };

        // BTreeMap iteration is name order, which decides segment roles
        let mut usable: Vec<SensorFile> = Vec::with_capacity(2);
        for (name, text) in files {
            let parsed = parse_rows(text);
            stats.rows_parsed += parsed.samples.len();
            stats.rows_skipped += parsed.skipped_rows;

            if parsed.samples.is_empty() {
                stats.empty_files += 1;
                debug!(file = %name, "sensor_file_empty");
                continue;
            }
            if usable.len() < 2 {
                usable.push(SensorFile::new(name.as_str(), parsed.samples));
            }
        }

        let [proximal, distal]: [SensorFile; 2] = usable
            .try_into()
            .map_err(|found: Vec<SensorFile>| {
                AnalysisError::InsufficientSensorData { found: found.len() }
            })?;

        info!(
            exercise = %exercise,
            proximal = %proximal.name,
            proximal_rows = proximal.len(),
            distal = %distal.name,
            distal_rows = distal.len(),
            "segments_assigned"
        );

        let result = self.analyze_segments(&proximal, &distal, exercise, &mut stats)?;
        stats.set_elapsed(started.elapsed());

        info!(
            exercise = %exercise,
            repetitions = result.metrics.repetition_count,
            max_flexion = format!("{:.1}", result.metrics.max_flexion_angle),
            max_extension = format!("{:.1}", result.metrics.max_extension_angle),
            dominant_side = result.metrics.weight_distribution.dominant_side.as_str(),
            "analysis_complete"
        );

        Ok(Analysis { result, proximal: proximal.name, distal: distal.name, stats })
    }

    /// Run the numeric stages on an assigned proximal/distal pair
    pub fn analyze_segments(
        &self,
        proximal: &SensorFile,
        distal: &SensorFile,
        exercise: ExerciseType,
        stats: &mut RunStats,
    ) -> Result<AnalysisResult, AnalysisError> {
        let mut load = (self.load_estimator)();

        let series = compute_joint_angles(
            proximal,
            distal,
            self.config.angle_method(),
            self.config.degenerate_policy(),
            &mut *load,
        )?;
        stats.frames_aligned = series.aligned_frames;
        stats.frames_dropped = series.dropped_frames;
        stats.identity_fallbacks = series.identity_fallbacks;
        stats.degenerate_substitutions = series.degenerate_substitutions;

        let params = self.config.repetition_params();
        let strategy = params.strategy_for(exercise);
        let events = detect_repetitions(&series.angles, strategy, params.min_frame_distance);
        stats.repetitions = events.len();
        debug!(strategy = ?strategy, events = events.len(), "repetitions_detected");

        Ok(assemble_result(exercise, series.angles, events, &*load, self.config.tie_side()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::WeightDistribution;
    use crate::domain::types::{Sample, Side};

    const IDENTITY_ROWS: &str = "PacketCounter,Quat_W,Quat_X,Quat_Y,Quat_Z
1,1,0,0,0
2,1,0,0,0
3,1,0,0,0
";

    fn files(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries.iter().map(|(n, t)| (n.to_string(), t.to_string())).collect()
    }

    /// Always reports a fixed split
    struct FixedEstimator;

    impl LoadEstimator for FixedEstimator {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn observe(&mut self, _proximal: &Sample, _distal: &Sample) {}

        fn distribution(&self, _tie_side: Side) -> WeightDistribution {
            WeightDistribution {
                dominant_side: Side::Right,
                left_percent: 25.0,
                right_percent: 75.0,
            }
        }
    }

    #[test]
    fn test_segments_assigned_by_name_order() {
        let analyzer = MovementAnalyzer::new(Config::default());
        let analysis = analyzer
            .analyze_files(
                &files(&[
                    ("z_extra.csv", IDENTITY_ROWS),
                    ("b_shin.csv", IDENTITY_ROWS),
                    ("a_thigh.csv", IDENTITY_ROWS),
                ]),
                ExerciseType::Squat,
            )
            .unwrap();

        assert_eq!(analysis.proximal, "a_thigh.csv");
        assert_eq!(analysis.distal, "b_shin.csv");
        assert_eq!(analysis.stats.files_read, 3);
        assert_eq!(analysis.stats.frames_aligned, 3);
    }

    #[test]
    fn test_empty_files_are_not_segments() {
        let analyzer = MovementAnalyzer::new(Config::default());
        let analysis = analyzer
            .analyze_files(
                &files(&[
                    ("a_notes.txt", "no table here"),
                    ("b.csv", IDENTITY_ROWS),
                    ("c.csv", IDENTITY_ROWS),
                ]),
                ExerciseType::Squat,
            )
            .unwrap();

        assert_eq!(analysis.proximal, "b.csv");
        assert_eq!(analysis.distal, "c.csv");
        assert_eq!(analysis.stats.empty_files, 1);
    }

    #[test]
    fn test_single_usable_file_is_insufficient() {
        let analyzer = MovementAnalyzer::new(Config::default());
        let result = analyzer.analyze_files(
            &files(&[("a.csv", IDENTITY_ROWS), ("b.csv", "header only\n")]),
            ExerciseType::Squat,
        );
        assert!(matches!(result, Err(AnalysisError::InsufficientSensorData { found: 1 })));
    }

    #[test]
    fn test_custom_load_estimator() {
        let analyzer = MovementAnalyzer::new(Config::default())
            .with_load_estimator(|| Box::new(FixedEstimator));
        let analysis = analyzer
            .analyze_files(
                &files(&[("a.csv", IDENTITY_ROWS), ("b.csv", IDENTITY_ROWS)]),
                ExerciseType::Squat,
            )
            .unwrap();

        let weight = analysis.result.metrics.weight_distribution;
        assert_eq!(weight.dominant_side, Side::Right);
        assert_eq!(weight.right_percent, 75.0);
    }

    #[test]
    fn test_analyzer_exposes_config() {
        let analyzer = MovementAnalyzer::new(Config::default().with_egress_file("runs.jsonl"));
        assert_eq!(analyzer.config().egress_file(), "runs.jsonl");
        assert_eq!(analyzer.config().min_frame_distance(), 20);
    }

    #[test]
    fn test_configured_tie_side() {
        let analyzer = MovementAnalyzer::new(Config::default().with_tie_side(Side::Right));
        let analysis = analyzer
            .analyze_files(
                &files(&[("a.csv", IDENTITY_ROWS), ("b.csv", IDENTITY_ROWS)]),
                ExerciseType::Squat,
            )
            .unwrap();

        // No Euler data: even split, tie resolved to the configured side
        let weight = analysis.result.metrics.weight_distribution;
        assert_eq!(weight.left_percent, 50.0);
        assert_eq!(weight.dominant_side, Side::Right);
    }
}
