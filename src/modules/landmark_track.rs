use std::fs;
use std::path::Path;
use anyhow::{Context, Error};
use log::debug;
use serde::{Deserialize, Serialize};
use crate::error::AnalysisError;
use crate::modules::frame_source::{FrameStream, VideoSource};
use crate::utils::landmark::LandmarkSet;

/// LandmarkTrack stores the landmarks of every frame of a video, extracted
/// ahead of time. A `null` frame is a frame with no detected pose.
///
/// ```json
/// {"fps": 30.0, "frames": [{"LEFT_EAR": {"x": 0.42, "y": 0.2}}, null]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkTrack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    pub frames: Vec<Option<LandmarkSet>>,
}

impl LandmarkTrack {
    pub fn new(frames: Vec<Option<LandmarkSet>>) -> Self {
        LandmarkTrack { fps: None, frames }
    }

    pub fn from_json(content: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read landmark track {}", path.display()))?;
        LandmarkTrack::from_json(&content)
            .with_context(|| format!("cannot parse landmark track {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let content = serde_json::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// LandmarkTrackSource opens landmark track files in place of videos. Pair it
/// with `PrecomputedPoseEstimator`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LandmarkTrackSource;

impl VideoSource for LandmarkTrackSource {
    type Frame = Option<LandmarkSet>;
    type Stream = LandmarkTrackStream;

    fn open(&self, path: &Path) -> Result<LandmarkTrackStream, AnalysisError> {
        let track = LandmarkTrack::from_file(path)
            .map_err(|e| AnalysisError::source_unavailable(path, e))?;
        debug!("opened landmark track {} with {} frames", path.display(), track.frames.len());
        Ok(LandmarkTrackStream::new(track))
    }
}

pub struct LandmarkTrackStream {
    frames: Option<std::vec::IntoIter<Option<LandmarkSet>>>,
}

impl LandmarkTrackStream {
    pub fn new(track: LandmarkTrack) -> Self {
        LandmarkTrackStream {
            frames: Some(track.frames.into_iter()),
        }
    }
}

impl FrameStream for LandmarkTrackStream {
    type Frame = Option<LandmarkSet>;

    fn next_frame(&mut self) -> Result<Option<Option<LandmarkSet>>, Error> {
        match self.frames.as_mut() {
            None => Err(Error::msg("landmark track stream is closed")),
            Some(frames) => Ok(frames.next()),
        }
    }

    fn close(&mut self) {
        self.frames = None;
    }
}
