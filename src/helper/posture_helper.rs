use std::fmt;
use log::debug;
use serde::{Deserialize, Serialize, Serializer};
use crate::config::config::ClassifierConfig;
use crate::utils::landmark::{BodyLandmark, LandmarkSet};

/// The posture checks, in the order they run on a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureCheck {
    KneeSpread,
    BackStraightness,
    HeadTilt,
    FacingDirection,
}

impl PostureCheck {
    pub const ALL: [PostureCheck; 4] = [
        PostureCheck::KneeSpread,
        PostureCheck::BackStraightness,
        PostureCheck::HeadTilt,
        PostureCheck::FacingDirection,
    ];

    pub fn message(self) -> &'static str {
        match self {
            PostureCheck::KneeSpread => "Don't spread your knees too much.",
            PostureCheck::BackStraightness => "Keep your back straight.",
            PostureCheck::HeadTilt => "Your head is tilted.",
            PostureCheck::FacingDirection => "Face forward.",
        }
    }

    pub fn required_landmarks(self) -> &'static [BodyLandmark] {
        match self {
            PostureCheck::KneeSpread => &[
                BodyLandmark::LeftKnee,
                BodyLandmark::RightKnee,
                BodyLandmark::LeftHip,
            ],
            PostureCheck::BackStraightness => &[
                BodyLandmark::LeftShoulder,
                BodyLandmark::RightShoulder,
                BodyLandmark::LeftHip,
                BodyLandmark::RightHip,
            ],
            PostureCheck::HeadTilt => &[BodyLandmark::LeftEar, BodyLandmark::RightEar],
            PostureCheck::FacingDirection => &[BodyLandmark::LeftEye, BodyLandmark::RightEye],
        }
    }
}

/// Feedback is one triggered check on one frame.
///
/// It serializes as its message so results read as a plain list of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Feedback {
    pub check: PostureCheck,
    pub frame_index: u64,
}

impl Feedback {
    pub fn new(check: PostureCheck, frame_index: u64) -> Self {
        Feedback { check, frame_index }
    }

    pub fn message(&self) -> &'static str {
        self.check.message()
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for Feedback {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// PostureClassifier turns the landmarks of a single frame into feedback.
///
/// Every check runs on every frame with a pose. A check whose landmarks are
/// not all present is skipped for that frame; the others still run.
#[derive(Debug, Clone, Default)]
pub struct PostureClassifier {
    config: ClassifierConfig,
}

impl PostureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        PostureClassifier { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// evaluate runs one check.
    ///
    /// # Returns
    /// * `Some(true)` if the check fires, `Some(false)` if it passes and
    ///   `None` if a required landmark is missing
    pub fn evaluate(&self, check: PostureCheck, landmarks: &LandmarkSet) -> Option<bool> {
        match check {
            PostureCheck::KneeSpread => self.check_knee_position(landmarks),
            PostureCheck::BackStraightness => self.check_back_straightness(landmarks),
            PostureCheck::HeadTilt => self.check_head_tilt(landmarks),
            PostureCheck::FacingDirection => self.check_facing_forward(landmarks),
        }
    }

    /// classify returns the checks that fire on a frame, in check order.
    pub fn classify(&self, landmarks: &LandmarkSet) -> Vec<PostureCheck> {
        let mut triggered = Vec::with_capacity(PostureCheck::ALL.len());
        for check in PostureCheck::ALL {
            match self.evaluate(check, landmarks) {
                Some(true) => triggered.push(check),
                Some(false) => {}
                None => {
                    let missing: Vec<&str> = check.required_landmarks()
                        .iter()
                        .filter(|kind| !landmarks.contains(**kind))
                        .map(|kind| kind.name())
                        .collect();
                    debug!("skipping {check:?}, missing {}", missing.join(", "));
                }
            }
        }
        triggered
    }

    /// analyze_frame produces the feedback for one frame. A frame without a
    /// detected pose yields nothing.
    pub fn analyze_frame(&self, frame_index: u64, landmarks: Option<&LandmarkSet>) -> Vec<Feedback> {
        match landmarks {
            None => Vec::new(),
            Some(landmarks) => self.classify(landmarks)
                .into_iter()
                .map(|check| Feedback::new(check, frame_index))
                .collect(),
        }
    }

    fn check_knee_position(&self, landmarks: &LandmarkSet) -> Option<bool> {
        let left_knee = landmarks.get(BodyLandmark::LeftKnee)?;
        let right_knee = landmarks.get(BodyLandmark::RightKnee)?;
        let hip = landmarks.get(BodyLandmark::LeftHip)?;

        let knee_distance = left_knee.horizontal_gap(right_knee);
        let thigh_height = left_knee.vertical_gap(hip);
        Some(knee_distance > thigh_height * self.config.knee_spread_ratio)
    }

    fn check_back_straightness(&self, landmarks: &LandmarkSet) -> Option<bool> {
        let left_shoulder = landmarks.get(BodyLandmark::LeftShoulder)?;
        let right_shoulder = landmarks.get(BodyLandmark::RightShoulder)?;
        let left_hip = landmarks.get(BodyLandmark::LeftHip)?;
        let right_hip = landmarks.get(BodyLandmark::RightHip)?;

        let shoulder_slope = left_shoulder.vertical_gap(right_shoulder);
        let hip_slope = left_hip.vertical_gap(right_hip);
        Some(shoulder_slope > self.config.shoulder_level_tolerance || hip_slope > self.config.hip_level_tolerance)
    }

    fn check_head_tilt(&self, landmarks: &LandmarkSet) -> Option<bool> {
        let left_ear = landmarks.get(BodyLandmark::LeftEar)?;
        let right_ear = landmarks.get(BodyLandmark::RightEar)?;

        Some(left_ear.vertical_gap(right_ear) > self.config.ear_level_tolerance)
    }

    fn check_facing_forward(&self, landmarks: &LandmarkSet) -> Option<bool> {
        let left_eye = landmarks.get(BodyLandmark::LeftEye)?;
        let right_eye = landmarks.get(BodyLandmark::RightEye)?;

        Some(left_eye.horizontal_gap(right_eye) >= self.config.eye_gap_limit)
    }
}
