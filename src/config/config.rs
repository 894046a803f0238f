use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};
use crate::error::AnalysisError;

/// Thresholds for the posture checks, in normalized frame units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// knee spread fires when the horizontal knee gap exceeds this multiple
    /// of the left knee to left hip height
    pub knee_spread_ratio: f32,
    pub shoulder_level_tolerance: f32,
    pub hip_level_tolerance: f32,
    pub ear_level_tolerance: f32,
    /// facing direction fires at or above this horizontal eye gap
    pub eye_gap_limit: f32,
}

impl ClassifierConfig {
    pub fn new() -> Self {
        ClassifierConfig {
            knee_spread_ratio: 1.2,
            shoulder_level_tolerance: 0.05,
            hip_level_tolerance: 0.05,
            ear_level_tolerance: 0.01,
            eye_gap_limit: 0.1,
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        let fields = [
            ("knee_spread_ratio", self.knee_spread_ratio),
            ("shoulder_level_tolerance", self.shoulder_level_tolerance),
            ("hip_level_tolerance", self.hip_level_tolerance),
            ("ear_level_tolerance", self.ear_level_tolerance),
            ("eye_gap_limit", self.eye_gap_limit),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::InvalidConfig(format!("{name} must be a non-negative number, got {value}")))
            }
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoseEstimatorConfig {
    pub model_name: String,
    /// poses scored under this are reported as no detection
    pub min_detection_confidence: f32,
    /// for estimators that track a pose across frames; below this they
    /// fall back to detection on the next frame
    pub min_tracking_confidence: f32,
    /// landmarks with visibility under this are dropped when decoding
    pub min_visibility: f32,
}

impl PoseEstimatorConfig {
    pub fn new() -> Self {
        PoseEstimatorConfig {
            model_name: "pose_landmark_full".to_string(),
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            min_visibility: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        let fields = [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
            ("min_visibility", self.min_visibility),
        ];
        for (name, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(AnalysisError::InvalidConfig(format!("{name} must be within [0, 1], got {value}")))
            }
        }
        Ok(())
    }
}

impl Default for PoseEstimatorConfig {
    fn default() -> Self {
        PoseEstimatorConfig::new()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub classifier: ClassifierConfig,
    pub estimator: PoseEstimatorConfig,
    /// base directory for relative video paths in requests
    pub video_root: Option<PathBuf>,
}

impl AnalysisConfig {
    pub fn from_json(content: &str) -> Result<Self, Error> {
        let config: AnalysisConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        AnalysisConfig::from_json(&content)
            .with_context(|| format!("cannot load config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.classifier.validate()?;
        self.estimator.validate()
    }
}
