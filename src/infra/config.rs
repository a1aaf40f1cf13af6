//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml
//!
//! Every section is optional; missing keys fall back to the engine defaults.

use crate::domain::types::Side;
use crate::services::joint_angle::AngleMethod;
use crate::services::load_estimator::TIE_BREAK_SIDE;
use crate::services::orientation::DegeneratePolicy;
use crate::services::repetition::{
    RepetitionParams, EXTENSION_PEAK_FRACTION, MIN_FRAME_DISTANCE, SQUAT_THRESHOLD_DEG,
};
use anyhow::{ensure, Context};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config/dev.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct RepetitionConfig {
    /// Squat valleys must dip below this angle (degrees)
    #[serde(default = "default_squat_threshold_deg")]
    pub squat_threshold_deg: f64,
    /// Knee-extension peaks must clear min + fraction * (max - min)
    #[serde(default = "default_extension_peak_fraction")]
    pub extension_peak_fraction: f64,
    /// Minimum frames between two accepted repetitions
    #[serde(default = "default_min_frame_distance")]
    pub min_frame_distance: usize,
}

fn default_squat_threshold_deg() -> f64 {
    SQUAT_THRESHOLD_DEG
}

fn default_extension_peak_fraction() -> f64 {
    EXTENSION_PEAK_FRACTION
}

fn default_min_frame_distance() -> usize {
    MIN_FRAME_DISTANCE
}

impl Default for RepetitionConfig {
    fn default() -> Self {
        Self {
            squat_threshold_deg: default_squat_threshold_deg(),
            extension_peak_fraction: default_extension_peak_fraction(),
            min_frame_distance: default_min_frame_distance(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OrientationConfig {
    /// "fail" or "identity"
    #[serde(default)]
    pub degenerate_policy: DegeneratePolicy,
    /// "reference_axis" or "relative_rotation"
    #[serde(default)]
    pub angle_method: AngleMethod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightConfig {
    /// Side reported when left and right percentages are equal
    #[serde(default = "default_tie_side")]
    pub tie_side: Side,
}

fn default_tie_side() -> Side {
    TIE_BREAK_SIDE
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self { tie_side: default_tie_side() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EgressConfig {
    /// File path for analysis egress (JSONL format)
    #[serde(default = "default_egress_file")]
    pub file: String,
}

impl Default for EgressConfig {
    fn default() -> Self {
        Self { file: default_egress_file() }
    }
}

fn default_egress_file() -> String {
    "analyses.jsonl".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub repetition: RepetitionConfig,
    #[serde(default)]
    pub orientation: OrientationConfig,
    #[serde(default)]
    pub weight: WeightConfig,
    #[serde(default)]
    pub egress: EgressConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    squat_threshold_deg: f64,
    extension_peak_fraction: f64,
    min_frame_distance: usize,
    degenerate_policy: DegeneratePolicy,
    angle_method: AngleMethod,
    tie_side: Side,
    egress_file: String,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            squat_threshold_deg: SQUAT_THRESHOLD_DEG,
            extension_peak_fraction: EXTENSION_PEAK_FRACTION,
            min_frame_distance: MIN_FRAME_DISTANCE,
            degenerate_policy: DegeneratePolicy::Fail,
            angle_method: AngleMethod::ReferenceAxis,
            tie_side: TIE_BREAK_SIDE,
            egress_file: "analyses.jsonl".to_string(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Determine config file path from an explicit argument or environment
    pub fn resolve_config_path(cli_path: Option<&str>) -> String {
        if let Some(path) = cli_path {
            return path.to_string();
        }

        // Check CONFIG_FILE environment variable
        if let Ok(path) = env::var("CONFIG_FILE") {
            return path;
        }

        DEFAULT_CONFIG_PATH.to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        let config = Self::from_toml(toml_config, path.display().to_string());
        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    fn from_toml(toml_config: TomlConfig, config_file: String) -> Self {
        Self {
            squat_threshold_deg: toml_config.repetition.squat_threshold_deg,
            extension_peak_fraction: toml_config.repetition.extension_peak_fraction,
            min_frame_distance: toml_config.repetition.min_frame_distance,
            degenerate_policy: toml_config.orientation.degenerate_policy,
            angle_method: toml_config.orientation.angle_method,
            tie_side: toml_config.weight.tie_side,
            egress_file: toml_config.egress.file,
            config_file,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            (0.0..=180.0).contains(&self.squat_threshold_deg),
            "repetition.squat_threshold_deg must be within [0, 180], got {}",
            self.squat_threshold_deg
        );
        ensure!(
            (0.0..=1.0).contains(&self.extension_peak_fraction),
            "repetition.extension_peak_fraction must be within [0, 1], got {}",
            self.extension_peak_fraction
        );
        ensure!(!self.egress_file.is_empty(), "egress.file must not be empty");
        Ok(())
    }

    /// Load configuration - tries TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    /// Parameters for the repetition detector
    pub fn repetition_params(&self) -> RepetitionParams {
        RepetitionParams {
            squat_threshold_deg: self.squat_threshold_deg,
            extension_peak_fraction: self.extension_peak_fraction,
            min_frame_distance: self.min_frame_distance,
        }
    }

    // Getters for all config fields
    pub fn squat_threshold_deg(&self) -> f64 {
        self.squat_threshold_deg
    }

    pub fn extension_peak_fraction(&self) -> f64 {
        self.extension_peak_fraction
    }

    pub fn min_frame_distance(&self) -> usize {
        self.min_frame_distance
    }

    pub fn degenerate_policy(&self) -> DegeneratePolicy {
        self.degenerate_policy
    }

    pub fn angle_method(&self) -> AngleMethod {
        self.angle_method
    }

    pub fn tie_side(&self) -> Side {
        self.tie_side
    }

    pub fn egress_file(&self) -> &str {
        &self.egress_file
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method to set the degenerate quaternion policy
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    /// Builder method to set the joint angle method
    pub fn with_angle_method(mut self, method: AngleMethod) -> Self {
        self.angle_method = method;
        self
    }

    /// Builder method to set the weight tie-break side
    pub fn with_tie_side(mut self, side: Side) -> Self {
        self.tie_side = side;
        self
    }

    /// Builder method to set the egress file
    pub fn with_egress_file(mut self, file: &str) -> Self {
        self.egress_file = file.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.squat_threshold_deg(), 100.0);
        assert_eq!(config.extension_peak_fraction(), 0.8);
        assert_eq!(config.min_frame_distance(), 20);
        assert_eq!(config.degenerate_policy(), DegeneratePolicy::Fail);
        assert_eq!(config.angle_method(), AngleMethod::ReferenceAxis);
        assert_eq!(config.tie_side(), Side::Left);
        assert_eq!(config.repetition_params(), RepetitionParams::default());
    }

    #[test]
    fn test_resolve_config_path_from_arg() {
        assert_eq!(Config::resolve_config_path(Some("config/clinic.toml")), "config/clinic.toml");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let toml_config: TomlConfig = toml::from_str("").unwrap();
        let config = Config::from_toml(toml_config, "inline".to_string());

        assert_eq!(config.squat_threshold_deg(), SQUAT_THRESHOLD_DEG);
        assert_eq!(config.min_frame_distance(), MIN_FRAME_DISTANCE);
        assert_eq!(config.egress_file(), "analyses.jsonl");
        assert_eq!(config.tie_side(), TIE_BREAK_SIDE);
    }

    #[test]
    fn test_partial_section() {
        let toml_config: TomlConfig = toml::from_str(
            r#"
[repetition]
min_frame_distance = 30

[orientation]
angle_method = "relative_rotation"
"#,
        )
        .unwrap();
        let config = Config::from_toml(toml_config, "inline".to_string());

        assert_eq!(config.min_frame_distance(), 30);
        assert_eq!(config.squat_threshold_deg(), SQUAT_THRESHOLD_DEG);
        assert_eq!(config.angle_method(), AngleMethod::RelativeRotation);
        assert_eq!(config.degenerate_policy(), DegeneratePolicy::Fail);
    }

    #[test]
    fn test_validate_rejects_bad_fraction() {
        let config = Config { extension_peak_fraction: 1.5, ..Config::default() };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = Config::default()
            .with_angle_method(AngleMethod::RelativeRotation)
            .with_degenerate_policy(DegeneratePolicy::Identity)
            .with_tie_side(Side::Right)
            .with_egress_file("out/run.jsonl");

        assert_eq!(config.angle_method(), AngleMethod::RelativeRotation);
        assert_eq!(config.degenerate_policy(), DegeneratePolicy::Identity);
        assert_eq!(config.tie_side(), Side::Right);
        assert_eq!(config.egress_file(), "out/run.jsonl");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_egress_file_default() {
        // Verify that EgressConfig::default() returns proper default, not empty string
        let egress = EgressConfig::default();
        assert_eq!(egress.file, "analyses.jsonl");

        let config = Config::default();
        assert_eq!(config.egress_file(), "analyses.jsonl");
    }
}
