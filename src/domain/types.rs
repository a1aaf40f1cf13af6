//! Shared types for the movement engine

use crate::error::UnknownExercise;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Quaternion field names as exported by the sensors
pub const QUAT_W: &str = "Quat_W";
pub const QUAT_X: &str = "Quat_X";
pub const QUAT_Y: &str = "Quat_Y";
pub const QUAT_Z: &str = "Quat_Z";

/// Euler field names (degrees)
pub const EULER_X: &str = "Euler_X";
pub const EULER_Y: &str = "Euler_Y";
pub const EULER_Z: &str = "Euler_Z";

/// A single parsed cell. Non-numeric cells keep their raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Parse a raw cell; only finite numbers count as numeric
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => FieldValue::Number(value),
            _ => FieldValue::Text(raw.to_string()),
        }
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(_) => None,
        }
    }
}

/// One row of a sensor file, keyed by header name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    fields: FxHashMap<Arc<str>, FieldValue>,
}

impl Sample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Arc<str>, value: FieldValue) {
        self.fields.insert(name, value);
    }

    /// Builder for tests and synthetic data
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(Arc::from(name), FieldValue::Number(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Numeric value of a field, `None` if absent or non-numeric
    #[inline]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(FieldValue::as_number)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A parsed sensor export: one segment's time series
#[derive(Debug, Clone)]
pub struct SensorFile {
    pub name: String,
    pub samples: Vec<Sample>,
}

impl SensorFile {
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self { name: name.into(), samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Supported rehabilitation exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseType {
    #[serde(rename = "Squat")]
    Squat,
    #[serde(rename = "Leg Knee Extension")]
    LegKneeExtension,
}

impl ExerciseType {
    /// Selector string used by the upstream file picker
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Squat => "Squat",
            ExerciseType::LegKneeExtension => "Leg Knee Extension",
        }
    }
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExerciseType {
    type Err = UnknownExercise;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Squat" => Ok(ExerciseType::Squat),
            "Leg Knee Extension" => Ok(ExerciseType::LegKneeExtension),
            other => Err(UnknownExercise(other.to_string())),
        }
    }
}

/// Body side for the weight-distribution estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}
