pub mod frame_source;
pub mod landmark_track;
pub mod pose_estimator;

#[cfg(feature = "opencv")]
pub mod video_capture;
