use std::path::{Path, PathBuf};
use anyhow::Error;
use log::{debug, warn};
use ndarray::Array3;
use opencv::core::Mat;
use opencv::imgproc::{COLOR_BGR2RGB, cvt_color};
use opencv::prelude::*;
use opencv::videoio::{CAP_ANY, VideoCapture};
use crate::error::AnalysisError;
use crate::modules::frame_source::{FrameStream, VideoSource};
use crate::modules::pose_estimator::PoseEstimator;
use crate::utils::image::mat_to_ndarray;
use crate::utils::landmark::LandmarkSet;

/// OpenCvVideoSource decodes video files with OpenCV. Frames are RGB `Mat`s.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvVideoSource;

impl VideoSource for OpenCvVideoSource {
    type Frame = Mat;
    type Stream = OpenCvFrameStream;

    fn open(&self, path: &Path) -> Result<OpenCvFrameStream, AnalysisError> {
        let filename = path.to_str().ok_or_else(|| {
            AnalysisError::source_unavailable(path, Error::msg("video path is not valid UTF-8"))
        })?;

        let capture = VideoCapture::from_file(filename, CAP_ANY)
            .map_err(|e| AnalysisError::source_unavailable(path, e))?;
        let is_opened = capture.is_opened()
            .map_err(|e| AnalysisError::source_unavailable(path, e))?;
        if !is_opened {
            return Err(AnalysisError::source_unavailable(path, Error::msg("video capture did not open")))
        }

        debug!("opened video {}", path.display());
        Ok(OpenCvFrameStream {
            capture,
            path: path.to_path_buf(),
            released: false,
        })
    }
}

pub struct OpenCvFrameStream {
    capture: VideoCapture,
    path: PathBuf,
    released: bool,
}

impl FrameStream for OpenCvFrameStream {
    type Frame = Mat;

    fn next_frame(&mut self) -> Result<Option<Mat>, Error> {
        if self.released {
            return Err(Error::msg(format!("video {} is already released", self.path.display())))
        }

        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None)
        }

        let mut rgb = Mat::default();
        cvt_color(&frame, &mut rgb, COLOR_BGR2RGB, 0)?;
        Ok(Some(rgb))
    }

    fn close(&mut self) {
        if self.released {
            return
        }
        self.released = true;
        if let Err(e) = self.capture.release() {
            warn!("failed to release video {}: {e}", self.path.display());
        }
    }
}

/// NdarrayFrames lets an estimator that reads `[H, W, 3]` arrays run on the
/// `Mat` frames of `OpenCvVideoSource`.
#[derive(Debug, Clone)]
pub struct NdarrayFrames<E> {
    estimator: E,
}

impl<E> NdarrayFrames<E> {
    pub fn new(estimator: E) -> Self {
        NdarrayFrames { estimator }
    }
}

impl<E: PoseEstimator<Array3<u8>>> PoseEstimator<Mat> for NdarrayFrames<E> {
    fn estimate(&self, frame: &Mat) -> Result<Option<LandmarkSet>, Error> {
        let pixels = mat_to_ndarray(frame)?;
        self.estimator.estimate(&pixels)
    }
}
