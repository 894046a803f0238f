use std::path::PathBuf;

use crate::helper::posture_helper::Feedback;
use crate::pipeline::pipeline::VideoAnalysis;

/// Errors surfaced by an analysis run.
///
/// A frame without a detected pose and a check whose landmarks are missing are
/// not errors; they only mean no feedback for that frame or check.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("video file not found: {0}")]
    VideoNotFound(PathBuf),

    #[error("cannot open the video file for processing: {path}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The source failed after some frames were analyzed. `partial` holds
    /// everything accumulated before the failure.
    #[error("video source interrupted at frame {frame_index}")]
    Interrupted {
        frame_index: u64,
        partial: VideoAnalysis,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("analysis task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AnalysisError {
    pub(crate) fn source_unavailable(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        AnalysisError::SourceUnavailable {
            path: path.into(),
            source: source.into(),
        }
    }

    /// partial returns the feedback gathered before a mid-stream failure.
    pub fn partial(&self) -> Option<&[Feedback]> {
        match self {
            AnalysisError::Interrupted { partial, .. } => Some(&partial.feedback),
            _ => None,
        }
    }
}
