use std::sync::Arc;
use anyhow::Error;
use log::info;
use ndarray::Array2;
use crate::config::config::PoseEstimatorConfig;
use crate::utils::landmark::LandmarkSet;

/// PoseEstimator finds the body landmarks in a frame.
///
/// Implementations are built once and shared read-only between analysis
/// runs, so `estimate` takes `&self`. `Ok(None)` means no pose was found;
/// errors are reserved for real failures of the estimator.
pub trait PoseEstimator<F>: Send + Sync {
    fn estimate(&self, frame: &F) -> Result<Option<LandmarkSet>, Error>;
}

impl<F, E: PoseEstimator<F> + ?Sized> PoseEstimator<F> for Arc<E> {
    fn estimate(&self, frame: &F) -> Result<Option<LandmarkSet>, Error> {
        (**self).estimate(frame)
    }
}

impl<F, E: PoseEstimator<F> + ?Sized> PoseEstimator<F> for &E {
    fn estimate(&self, frame: &F) -> Result<Option<LandmarkSet>, Error> {
        (**self).estimate(frame)
    }
}

/// Raw output of a landmark model for one frame.
#[derive(Debug, Clone)]
pub struct PoseOutput {
    /// pose presence score
    pub score: f32,
    /// `[N, C]` landmark rows, see `LandmarkSet::from_tensor`
    pub landmarks: Array2<f32>,
}

/// PoseModel runs a landmark model on a frame and returns its raw output.
pub trait PoseModel<F>: Send + Sync {
    fn infer(&self, frame: &F) -> Result<Option<PoseOutput>, Error>;
}

/// TensorPoseEstimator decodes the raw output of a `PoseModel` into named
/// landmarks, applying the detection and visibility cut-offs.
#[derive(Debug, Clone)]
pub struct TensorPoseEstimator<M> {
    model: M,
    min_detection_confidence: f32,
    min_visibility: f32,
}

impl<M> TensorPoseEstimator<M> {
    pub fn new(model: M, config: &PoseEstimatorConfig) -> Self {
        info!(
            "pose estimator ready, model={} min_detection_confidence={} min_tracking_confidence={} min_visibility={}",
            config.model_name, config.min_detection_confidence, config.min_tracking_confidence, config.min_visibility
        );
        TensorPoseEstimator {
            model,
            min_detection_confidence: config.min_detection_confidence,
            min_visibility: config.min_visibility,
        }
    }
}

impl<F, M: PoseModel<F>> PoseEstimator<F> for TensorPoseEstimator<M> {
    fn estimate(&self, frame: &F) -> Result<Option<LandmarkSet>, Error> {
        let output = match self.model.infer(frame)? {
            None => return Ok(None),
            Some(output) => output,
        };
        if output.score < self.min_detection_confidence {
            return Ok(None)
        }

        let landmarks = LandmarkSet::from_tensor(&output.landmarks, self.min_visibility)?;
        if landmarks.is_empty() {
            return Ok(None)
        }
        Ok(Some(landmarks))
    }
}

/// PrecomputedPoseEstimator serves frames that already carry their landmarks,
/// such as the frames of a landmark track.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecomputedPoseEstimator;

impl PoseEstimator<Option<LandmarkSet>> for PrecomputedPoseEstimator {
    fn estimate(&self, frame: &Option<LandmarkSet>) -> Result<Option<LandmarkSet>, Error> {
        Ok(frame.clone())
    }
}
