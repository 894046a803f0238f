pub mod utils;
pub mod config;
pub mod error;
pub mod helper;
pub mod modules;
pub mod pipeline;

pub use config::config::{AnalysisConfig, ClassifierConfig, PoseEstimatorConfig};
pub use error::AnalysisError;
pub use helper::posture_helper::{Feedback, PostureCheck, PostureClassifier};
pub use modules::frame_source::{FrameStream, VideoSource};
pub use modules::pose_estimator::PoseEstimator;
pub use pipeline::pipeline::{PosturePipeline, VideoAnalysis};
pub use pipeline::service::{AnalysisResult, AnalyzeRequest, PostureService};
pub use utils::coordinate::Landmark;
pub use utils::landmark::{BodyLandmark, LandmarkSet};
