use std::path::Path;
use log::{debug, info, warn};
use serde::Serialize;
use crate::error::AnalysisError;
use crate::helper::posture_helper::{Feedback, PostureCheck, PostureClassifier};
use crate::modules::frame_source::{FrameStream, StreamGuard, VideoSource};
use crate::modules::pose_estimator::PoseEstimator;

/// Result of running the pipeline over one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoAnalysis {
    /// feedback in frame order, then check order within a frame
    pub feedback: Vec<Feedback>,
    pub frames_analyzed: u64,
    pub frames_with_pose: u64,
}

impl VideoAnalysis {
    pub fn messages(&self) -> Vec<&'static str> {
        self.feedback.iter().map(Feedback::message).collect()
    }

    pub fn summary(&self) -> Vec<FeedbackSummary> {
        summarize(&self.feedback)
    }
}

/// Occurrences of one check across a video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackSummary {
    pub check: PostureCheck,
    pub message: &'static str,
    pub occurrences: usize,
    pub first_frame: u64,
    pub last_frame: u64,
}

/// summarize groups feedback by check, ordered by first occurrence. The
/// feedback sequence itself is left untouched.
pub fn summarize(feedback: &[Feedback]) -> Vec<FeedbackSummary> {
    let mut summaries: Vec<FeedbackSummary> = Vec::new();
    for item in feedback {
        match summaries.iter_mut().find(|s| s.check == item.check) {
            Some(summary) => {
                summary.occurrences += 1;
                summary.first_frame = summary.first_frame.min(item.frame_index);
                summary.last_frame = summary.last_frame.max(item.frame_index);
            }
            None => summaries.push(FeedbackSummary {
                check: item.check,
                message: item.message(),
                occurrences: 1,
                first_frame: item.frame_index,
                last_frame: item.frame_index,
            }),
        }
    }
    summaries
}

/// PosturePipeline runs pose estimation and the posture checks over every
/// frame of a video, one frame at a time.
#[derive(Debug, Clone)]
pub struct PosturePipeline<E> {
    estimator: E,
    classifier: PostureClassifier,
}

impl<E> PosturePipeline<E> {

    /// new initializes new instance of the pipeline
    pub fn new(estimator: E, classifier: PostureClassifier) -> Self {
        PosturePipeline {
            estimator,
            classifier,
        }
    }

    pub fn classifier(&self) -> &PostureClassifier {
        &self.classifier
    }

    /// analyze_frame estimates the pose in one frame and classifies it.
    ///
    /// An estimator failure counts as no pose for that frame.
    ///
    /// # Returns
    /// * the frame's feedback and whether a pose was found
    pub fn analyze_frame<F>(&self, frame_index: u64, frame: &F) -> (Vec<Feedback>, bool)
    where
        E: PoseEstimator<F>,
    {
        let landmarks = match self.estimator.estimate(frame) {
            Ok(landmarks) => landmarks,
            Err(e) => {
                warn!("pose estimation failed on frame {frame_index}, treating as no pose: {e:#}");
                None
            }
        };
        let feedback = self.classifier.analyze_frame(frame_index, landmarks.as_ref());
        (feedback, landmarks.is_some())
    }

    /// analyze_stream pulls frames until the stream ends.
    ///
    /// A read failure stops the run with `AnalysisError::Interrupted`, which
    /// carries the feedback gathered so far.
    pub fn analyze_stream<S>(&self, stream: &mut S) -> Result<VideoAnalysis, AnalysisError>
    where
        S: FrameStream + ?Sized,
        E: PoseEstimator<S::Frame>,
    {
        let mut analysis = VideoAnalysis::default();
        loop {
            let frame_index = analysis.frames_analyzed;
            let frame = match stream.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    warn!("video source failed at frame {frame_index}: {e:#}");
                    return Err(AnalysisError::Interrupted {
                        frame_index,
                        partial: analysis,
                        source: e,
                    })
                }
            };

            let (feedback, has_pose) = self.analyze_frame(frame_index, &frame);
            if !feedback.is_empty() {
                debug!("frame {frame_index}: {} feedback", feedback.len());
            }
            analysis.feedback.extend(feedback);
            analysis.frames_analyzed += 1;
            if has_pose {
                analysis.frames_with_pose += 1;
            }
        }
        Ok(analysis)
    }

    /// analyze_video opens `path` on `source` and analyzes every frame. The
    /// stream is closed on every exit path.
    pub fn analyze_video<V>(&self, source: &V, path: &Path) -> Result<VideoAnalysis, AnalysisError>
    where
        V: VideoSource + ?Sized,
        E: PoseEstimator<V::Frame>,
    {
        info!("analyzing {}", path.display());
        let mut stream = StreamGuard::new(source.open(path)?);
        let analysis = self.analyze_stream(&mut *stream)?;
        info!(
            "analyzed {}: {} frames, {} with a pose, {} feedback",
            path.display(),
            analysis.frames_analyzed,
            analysis.frames_with_pose,
            analysis.feedback.len()
        );
        Ok(analysis)
    }
}
