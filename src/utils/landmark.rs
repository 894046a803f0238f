use std::collections::HashMap;
use std::fmt;
use anyhow::Error;
use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use crate::utils::coordinate::Landmark;
use crate::utils::utils::u8_to_f32_vec;

/// Body landmarks in the 33-point body topology, in estimator output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BodyLandmark {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl BodyLandmark {
    pub const COUNT: usize = 33;

    pub const ALL: [BodyLandmark; BodyLandmark::COUNT] = [
        BodyLandmark::Nose,
        BodyLandmark::LeftEyeInner,
        BodyLandmark::LeftEye,
        BodyLandmark::LeftEyeOuter,
        BodyLandmark::RightEyeInner,
        BodyLandmark::RightEye,
        BodyLandmark::RightEyeOuter,
        BodyLandmark::LeftEar,
        BodyLandmark::RightEar,
        BodyLandmark::MouthLeft,
        BodyLandmark::MouthRight,
        BodyLandmark::LeftShoulder,
        BodyLandmark::RightShoulder,
        BodyLandmark::LeftElbow,
        BodyLandmark::RightElbow,
        BodyLandmark::LeftWrist,
        BodyLandmark::RightWrist,
        BodyLandmark::LeftPinky,
        BodyLandmark::RightPinky,
        BodyLandmark::LeftIndex,
        BodyLandmark::RightIndex,
        BodyLandmark::LeftThumb,
        BodyLandmark::RightThumb,
        BodyLandmark::LeftHip,
        BodyLandmark::RightHip,
        BodyLandmark::LeftKnee,
        BodyLandmark::RightKnee,
        BodyLandmark::LeftAnkle,
        BodyLandmark::RightAnkle,
        BodyLandmark::LeftHeel,
        BodyLandmark::RightHeel,
        BodyLandmark::LeftFootIndex,
        BodyLandmark::RightFootIndex,
    ];

    /// index is the row of this landmark in an estimator's output tensor.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        BodyLandmark::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            BodyLandmark::Nose => "NOSE",
            BodyLandmark::LeftEyeInner => "LEFT_EYE_INNER",
            BodyLandmark::LeftEye => "LEFT_EYE",
            BodyLandmark::LeftEyeOuter => "LEFT_EYE_OUTER",
            BodyLandmark::RightEyeInner => "RIGHT_EYE_INNER",
            BodyLandmark::RightEye => "RIGHT_EYE",
            BodyLandmark::RightEyeOuter => "RIGHT_EYE_OUTER",
            BodyLandmark::LeftEar => "LEFT_EAR",
            BodyLandmark::RightEar => "RIGHT_EAR",
            BodyLandmark::MouthLeft => "MOUTH_LEFT",
            BodyLandmark::MouthRight => "MOUTH_RIGHT",
            BodyLandmark::LeftShoulder => "LEFT_SHOULDER",
            BodyLandmark::RightShoulder => "RIGHT_SHOULDER",
            BodyLandmark::LeftElbow => "LEFT_ELBOW",
            BodyLandmark::RightElbow => "RIGHT_ELBOW",
            BodyLandmark::LeftWrist => "LEFT_WRIST",
            BodyLandmark::RightWrist => "RIGHT_WRIST",
            BodyLandmark::LeftPinky => "LEFT_PINKY",
            BodyLandmark::RightPinky => "RIGHT_PINKY",
            BodyLandmark::LeftIndex => "LEFT_INDEX",
            BodyLandmark::RightIndex => "RIGHT_INDEX",
            BodyLandmark::LeftThumb => "LEFT_THUMB",
            BodyLandmark::RightThumb => "RIGHT_THUMB",
            BodyLandmark::LeftHip => "LEFT_HIP",
            BodyLandmark::RightHip => "RIGHT_HIP",
            BodyLandmark::LeftKnee => "LEFT_KNEE",
            BodyLandmark::RightKnee => "RIGHT_KNEE",
            BodyLandmark::LeftAnkle => "LEFT_ANKLE",
            BodyLandmark::RightAnkle => "RIGHT_ANKLE",
            BodyLandmark::LeftHeel => "LEFT_HEEL",
            BodyLandmark::RightHeel => "RIGHT_HEEL",
            BodyLandmark::LeftFootIndex => "LEFT_FOOT_INDEX",
            BodyLandmark::RightFootIndex => "RIGHT_FOOT_INDEX",
        }
    }
}

impl fmt::Display for BodyLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// LandmarkSet holds the landmarks detected for a single frame, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    landmarks: HashMap<BodyLandmark, Landmark>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        LandmarkSet::default()
    }

    pub fn insert(&mut self, kind: BodyLandmark, landmark: Landmark) -> Option<Landmark> {
        self.landmarks.insert(kind, landmark)
    }

    pub fn with(mut self, kind: BodyLandmark, landmark: Landmark) -> Self {
        self.insert(kind, landmark);
        self
    }

    pub fn remove(&mut self, kind: BodyLandmark) -> Option<Landmark> {
        self.landmarks.remove(&kind)
    }

    pub fn get(&self, kind: BodyLandmark) -> Option<&Landmark> {
        self.landmarks.get(&kind)
    }

    pub fn contains(&self, kind: BodyLandmark) -> bool {
        self.landmarks.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyLandmark, &Landmark)> {
        self.landmarks.iter().map(|(kind, lmk)| (*kind, lmk))
    }

    /// from_tensor decodes an estimator output of shape `[N, C]`.
    ///
    /// Row `i` is the landmark with index `i`; columns are `x, y` and
    /// optionally `z` and `visibility`. Rows past the body topology are ignored
    /// and landmarks whose visibility is under `min_visibility` are dropped.
    ///
    /// # Arguments
    /// * `output` - raw landmark rows
    /// * `min_visibility` - visibility cut-off, 0.0 keeps every row
    pub fn from_tensor(output: &Array2<f32>, min_visibility: f32) -> Result<Self, Error> {
        let (rows, cols) = output.dim();
        if cols < 2 {
            return Err(Error::msg(format!("landmark tensor needs at least 2 columns, got {cols}")))
        }
        if rows < BodyLandmark::COUNT {
            debug!("landmark tensor has {rows} rows, expected {}", BodyLandmark::COUNT);
        }

        let mut set = LandmarkSet::new();
        for (kind, row) in BodyLandmark::ALL.iter().zip(output.outer_iter()) {
            let z = if cols > 2 { row[2] } else { 0.0 };
            let visibility = if cols > 3 { row[3] } else { 1.0 };
            if visibility < min_visibility {
                continue;
            }
            set.insert(*kind, Landmark { x: row[0], y: row[1], z, visibility });
        }
        Ok(set)
    }

    /// from_le_bytes decodes a little-endian f32 buffer laid out as `[N, cols]`.
    pub fn from_le_bytes(bytes: &[u8], cols: usize, min_visibility: f32) -> Result<Self, Error> {
        if cols == 0 {
            return Err(Error::msg("landmark buffer column count must be positive"))
        }
        let values = u8_to_f32_vec(bytes)?;
        if values.len() % cols != 0 {
            return Err(Error::msg(format!(
                "landmark buffer holds {} values, not a multiple of {cols}",
                values.len()
            )))
        }
        let rows = values.len() / cols;
        let output = Array2::from_shape_vec((rows, cols), values)?;
        LandmarkSet::from_tensor(&output, min_visibility)
    }
}

impl FromIterator<(BodyLandmark, Landmark)> for LandmarkSet {
    fn from_iter<T: IntoIterator<Item = (BodyLandmark, Landmark)>>(iter: T) -> Self {
        LandmarkSet {
            landmarks: iter.into_iter().collect(),
        }
    }
}

/// A seated pose that triggers none of the posture checks.
#[cfg(test)]
pub(crate) fn neutral_pose() -> LandmarkSet {
    LandmarkSet::new()
        .with(BodyLandmark::Nose, Landmark::new(0.475, 0.2))
        .with(BodyLandmark::LeftEye, Landmark::new(0.45, 0.18))
        .with(BodyLandmark::RightEye, Landmark::new(0.5, 0.18))
        .with(BodyLandmark::LeftEar, Landmark::new(0.42, 0.2))
        .with(BodyLandmark::RightEar, Landmark::new(0.53, 0.2))
        .with(BodyLandmark::LeftShoulder, Landmark::new(0.35, 0.35))
        .with(BodyLandmark::RightShoulder, Landmark::new(0.6, 0.35))
        .with(BodyLandmark::LeftHip, Landmark::new(0.4, 0.6))
        .with(BodyLandmark::RightHip, Landmark::new(0.55, 0.6))
        .with(BodyLandmark::LeftKnee, Landmark::new(0.4, 0.8))
        .with(BodyLandmark::RightKnee, Landmark::new(0.5, 0.8))
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use crate::utils::coordinate::Landmark;
    use crate::utils::landmark::{BodyLandmark, LandmarkSet};

    #[test]
    fn test_index_round_trip() {
        for (i, kind) in BodyLandmark::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(BodyLandmark::from_index(i), Some(*kind));
        }
        assert_eq!(BodyLandmark::LeftKnee.index(), 25);
        assert_eq!(BodyLandmark::from_index(33), None);
    }

    #[test]
    fn test_name_matches_serde() {
        for kind in BodyLandmark::ALL {
            let encoded = serde_json::to_string(&kind).unwrap();
            assert_eq!(encoded, format!("\"{}\"", kind.name()));
        }
    }

    #[test]
    fn test_from_tensor_maps_rows_to_names() {
        let mut output = Array2::<f32>::zeros((BodyLandmark::COUNT, 4));
        output[[BodyLandmark::LeftKnee.index(), 0]] = 0.25;
        output[[BodyLandmark::LeftKnee.index(), 1]] = 0.75;
        output[[BodyLandmark::LeftKnee.index(), 3]] = 0.9;

        let set = LandmarkSet::from_tensor(&output, 0.0).unwrap();
        assert_eq!(set.len(), BodyLandmark::COUNT);
        let knee = set.get(BodyLandmark::LeftKnee).unwrap();
        assert_eq!((knee.x, knee.y, knee.visibility), (0.25, 0.75, 0.9));
    }

    #[test]
    fn test_from_tensor_drops_low_visibility() {
        let mut output = Array2::<f32>::from_elem((BodyLandmark::COUNT, 4), 0.5);
        output[[BodyLandmark::RightKnee.index(), 3]] = 0.1;

        let set = LandmarkSet::from_tensor(&output, 0.3).unwrap();
        assert!(!set.contains(BodyLandmark::RightKnee));
        assert_eq!(set.len(), BodyLandmark::COUNT - 1);
    }

    #[test]
    fn test_from_tensor_two_columns() {
        let output = Array2::<f32>::from_elem((3, 2), 0.5);
        let set = LandmarkSet::from_tensor(&output, 0.5).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(BodyLandmark::LeftEyeInner), Some(&Landmark::new(0.5, 0.5)));
        assert!(LandmarkSet::from_tensor(&Array2::<f32>::zeros((33, 1)), 0.0).is_err());
    }

    #[test]
    fn test_from_le_bytes() {
        let values = [0.1f32, 0.2, 0.0, 1.0, 0.3, 0.4, 0.0, 1.0];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();

        let set = LandmarkSet::from_le_bytes(&bytes, 4, 0.0).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(BodyLandmark::Nose).map(|l| l.x), Some(0.1));
        assert_eq!(set.get(BodyLandmark::LeftEyeInner).map(|l| l.y), Some(0.4));
        assert!(LandmarkSet::from_le_bytes(&bytes, 3, 0.0).is_err());
    }

    #[test]
    fn test_landmark_set_json_is_name_keyed() {
        let set = LandmarkSet::new().with(BodyLandmark::LeftEar, Landmark::new(0.5, 0.25));
        let encoded = serde_json::to_value(&set).unwrap();
        assert_eq!(encoded["LEFT_EAR"]["x"], 0.5);

        let decoded: LandmarkSet = serde_json::from_str(r#"{"RIGHT_EAR":{"x":0.5,"y":0.25}}"#).unwrap();
        assert_eq!(decoded.get(BodyLandmark::RightEar), Some(&Landmark::new(0.5, 0.25)));
    }
}
