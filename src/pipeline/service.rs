use std::path::PathBuf;
use std::sync::Arc;
use log::info;
use serde::{Deserialize, Serialize};
use crate::config::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::helper::posture_helper::{Feedback, PostureClassifier};
use crate::modules::frame_source::VideoSource;
use crate::modules::pose_estimator::PoseEstimator;
use crate::pipeline::pipeline::{summarize, FeedbackSummary, PosturePipeline};

/// Metadata of an interview submission. It is echoed back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub email: String,
    pub id: String,
    pub name: String,
    pub pdf_url: Option<String>,
    pub question1: String,
    pub question2: String,
    pub question3: String,
    pub question4: String,
    pub video_path: String,
    pub timestamp: String,
}

impl AnalyzeRequest {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.video_path.trim().is_empty() {
            return Err(AnalysisError::InvalidRequest("videoPath must not be empty".to_string()))
        }
        Ok(())
    }
}

/// Feedback for one submission together with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub extracted_data: AnalyzeRequest,
    pub feedback: Vec<Feedback>,
}

impl AnalysisResult {
    pub fn summary(&self) -> Vec<FeedbackSummary> {
        summarize(&self.feedback)
    }
}

/// PostureService analyzes submissions against a shared estimator.
///
/// Build it once at startup; clones share the source, estimator and
/// classifier.
pub struct PostureService<V, E: ?Sized> {
    source: Arc<V>,
    pipeline: Arc<PosturePipeline<Arc<E>>>,
    video_root: Option<PathBuf>,
}

impl<V, E: ?Sized> Clone for PostureService<V, E> {
    fn clone(&self) -> Self {
        PostureService {
            source: Arc::clone(&self.source),
            pipeline: Arc::clone(&self.pipeline),
            video_root: self.video_root.clone(),
        }
    }
}

impl<V, E> PostureService<V, E>
where
    V: VideoSource + 'static,
    E: PoseEstimator<V::Frame> + ?Sized + 'static,
{
    pub fn new(source: V, estimator: Arc<E>, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        let classifier = PostureClassifier::new(config.classifier.clone());
        Ok(PostureService {
            source: Arc::new(source),
            pipeline: Arc::new(PosturePipeline::new(estimator, classifier)),
            video_root: config.video_root.clone(),
        })
    }

    /// resolve_video_path joins relative request paths onto the configured
    /// video root.
    pub fn resolve_video_path(&self, video_path: &str) -> PathBuf {
        let path = PathBuf::from(video_path);
        match &self.video_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }

    /// analyze_blocking runs a submission on the calling thread.
    pub fn analyze_blocking(&self, request: AnalyzeRequest) -> Result<AnalysisResult, AnalysisError> {
        request.validate()?;
        let path = self.resolve_video_path(&request.video_path);
        if !path.exists() {
            return Err(AnalysisError::VideoNotFound(path))
        }

        let analysis = self.pipeline.analyze_video(&*self.source, &path)?;
        info!("submission {}: {} feedback", request.id, analysis.feedback.len());
        Ok(AnalysisResult {
            extracted_data: request,
            feedback: analysis.feedback,
        })
    }

    /// analyze runs a submission on tokio's blocking pool.
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResult, AnalysisError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.analyze_blocking(request)).await?
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use crate::config::config::AnalysisConfig;
    use crate::error::AnalysisError;
    use crate::modules::landmark_track::{LandmarkTrack, LandmarkTrackSource};
    use crate::modules::pose_estimator::{PoseEstimator, PrecomputedPoseEstimator};
    use crate::pipeline::pipeline::tests::three_frame_track;
    use crate::pipeline::service::{AnalyzeRequest, PostureService};
    use crate::utils::landmark::LandmarkSet;

    type TrackService = PostureService<LandmarkTrackSource, dyn PoseEstimator<Option<LandmarkSet>>>;

    fn service(video_root: Option<PathBuf>) -> TrackService {
        let estimator: Arc<dyn PoseEstimator<Option<LandmarkSet>>> = Arc::new(PrecomputedPoseEstimator);
        let config = AnalysisConfig { video_root, ..AnalysisConfig::default() };
        PostureService::new(LandmarkTrackSource, estimator, &config).unwrap()
    }

    fn request(video_path: &str) -> AnalyzeRequest {
        AnalyzeRequest {
            email: "applicant@example.com".to_string(),
            id: "sub-42".to_string(),
            name: "Applicant".to_string(),
            pdf_url: None,
            question1: "Tell us about yourself.".to_string(),
            question2: "Why this role?".to_string(),
            question3: "A hard problem you solved?".to_string(),
            question4: "Questions for us?".to_string(),
            video_path: video_path.to_string(),
            timestamp: "2024-11-02T10:15:00Z".to_string(),
        }
    }

    fn write_track(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        three_frame_track().save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_analyze_echoes_request_and_feedback() {
        let dir = TempDir::new().unwrap();
        let path = write_track(&dir, "full.json");
        let result = service(None).analyze(request(path.to_str().unwrap())).await.unwrap();

        assert_eq!(result.extracted_data.id, "sub-42");
        let encoded = serde_json::to_value(&result).unwrap();
        assert_eq!(encoded["feedback"], serde_json::json!([
            "Don't spread your knees too much.",
            "Your head is tilted.",
            "Face forward."
        ]));
        assert_eq!(encoded["extracted_data"]["videoPath"], path.to_str().unwrap());
        assert!(encoded["extracted_data"]["pdfUrl"].is_null());
        assert_eq!(result.summary().len(), 3);
    }

    #[tokio::test]
    async fn test_relative_path_uses_video_root() {
        let dir = TempDir::new().unwrap();
        let path = write_track(&dir, "relative.json");
        let service = service(Some(dir.path().to_path_buf()));

        assert_eq!(service.resolve_video_path("relative.json"), path);
        let result = service.analyze(request("relative.json")).await.unwrap();

        assert_eq!(result.feedback.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_video_is_not_found() {
        let err = service(None).analyze(request("/nonexistent/interview.json")).await.unwrap_err();
        assert!(matches!(err, AnalysisError::VideoNotFound(_)));
    }

    #[tokio::test]
    async fn test_unreadable_video_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.json");
        std::fs::write(&path, "not a track").unwrap();

        let err = service(None).analyze(request(path.to_str().unwrap())).await.unwrap_err();
        assert!(matches!(err, AnalysisError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_empty_track_has_no_feedback() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        LandmarkTrack::new(vec![None; 5]).save(&path).unwrap();

        let result = service(None).analyze_blocking(request(path.to_str().unwrap())).unwrap();
        assert!(result.feedback.is_empty());
    }

    #[test]
    fn test_invalid_request() {
        let err = service(None).analyze_blocking(request("  ")).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRequest(_)));
    }

    #[test]
    fn test_empty_id_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = write_track(&dir, "anonymous.json");
        let anonymous = AnalyzeRequest { id: String::new(), ..request(path.to_str().unwrap()) };

        let result = service(None).analyze_blocking(anonymous).unwrap();
        assert_eq!(result.extracted_data.id, "");
        assert_eq!(result.feedback.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_analyses_share_one_estimator() {
        let dir = TempDir::new().unwrap();
        let path = write_track(&dir, "shared.json");
        let service = service(None);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                let submission = AnalyzeRequest { id: format!("sub-{i}"), ..request(path.to_str().unwrap()) };
                tokio::spawn(async move { service.analyze(submission).await })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result.extracted_data.id, format!("sub-{i}"));
            let messages: Vec<&str> = result.feedback.iter().map(|f| f.message()).collect();
            assert_eq!(messages, vec![
                "Don't spread your knees too much.",
                "Your head is tilted.",
                "Face forward.",
            ]);
        }
    }

    #[test]
    fn test_request_wire_names() {
        let decoded: AnalyzeRequest = serde_json::from_str(r#"{
            "email": "a@b.c", "id": "1", "name": "n", "pdfUrl": "https://example.com/cv.pdf",
            "question1": "q1", "question2": "q2", "question3": "q3", "question4": "q4",
            "videoPath": "videos/1.mp4", "timestamp": "t"
        }"#).unwrap();

        assert_eq!(decoded.pdf_url.as_deref(), Some("https://example.com/cv.pdf"));
        assert_eq!(decoded.video_path, "videos/1.mp4");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let estimator: Arc<dyn PoseEstimator<Option<LandmarkSet>>> = Arc::new(PrecomputedPoseEstimator);
        let mut config = AnalysisConfig::default();
        config.classifier.knee_spread_ratio = f32::NAN;

        let result = PostureService::new(LandmarkTrackSource, estimator, &config);
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }
}
