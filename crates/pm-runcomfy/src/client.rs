use std::time::Duration;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, error, info};
use pm_core::{GenerationKind, GenerationOutputs, GenerationRequest, MIN_VIDEO_DURATION};
use crate::api::GenerationApi;
use crate::error::ClientError;
use crate::schemas::{
    ImageModelRequest, ResultResponse, StatusReport, StatusResponse, SubmitResponse,
    VideoModelRequest,
};

pub const DEFAULT_API_URL: &str = "https://model-api.runcomfy.net";

pub const IMAGE_MODEL_ID: &str = "blackforestlabs/flux-1-kontext/pro/edit";
pub const VIDEO_MODEL_ID: &str = "bytedance/seedance-1-0/pro/fast/image-to-video";

/// Range the video model itself accepts, in seconds
const VIDEO_MODEL_MIN_SECS: u8 = 2;
const VIDEO_MODEL_MAX_SECS: u8 = 12;
const VIDEO_SEED_RANGE: u32 = 100_000_000;

#[derive(Debug, Clone)]
pub struct RunComfyConfig {
    pub base_url: String,
    pub api_token: String,
    pub timeout: Duration,
}

impl Default for RunComfyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_token: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the RunComfy model API
#[derive(Debug, Clone)]
pub struct RunComfyClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl RunComfyClient {
    pub fn new(config: RunComfyConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token,
        })
    }

    fn model_url(&self, model_id: &str) -> String {
        format!("{}/v1/models/{}", self.base_url, model_id)
    }

    fn request_url(&self, job_id: &str, action: &str) -> String {
        format!("{}/v1/requests/{}/{}", self.base_url, job_id, action)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {}", self.api_token))
    }

    async fn post_model<B: Serialize + Sync>(&self, model_id: &str, body: &B) -> Result<String, ClientError> {
        let url = self.model_url(model_id);
        debug!(%url, "submitting generation request");

        let response = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Submission(e.to_string()))?;

        let response = ensure_success(response).await.map_err(|msg| {
            error!(model = model_id, error = %msg, "generation request rejected");
            ClientError::Submission(msg)
        })?;

        let data: SubmitResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Submission(format!("Invalid response: {e}")))?;

        match data.request_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                info!(model = model_id, request_id = %id, "generation request accepted");
                Ok(id)
            }
            None => Err(ClientError::Submission("Failed to submit generation request".to_string())),
        }
    }
}

/// Passes successful responses through; otherwise returns `HTTP <code>: <body>`
async fn ensure_success(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(format!("HTTP {}: {}", status, body))
}

fn video_duration(request: &GenerationRequest) -> u8 {
    request
        .duration
        .unwrap_or(MIN_VIDEO_DURATION)
        .clamp(VIDEO_MODEL_MIN_SECS, VIDEO_MODEL_MAX_SECS)
}

#[async_trait]
impl GenerationApi for RunComfyClient {
    async fn submit(&self, image_url: &str, request: &GenerationRequest) -> Result<String, ClientError> {
        let prompt = request.full_prompt();

        match request.kind {
            GenerationKind::Image => {
                let body = ImageModelRequest {
                    prompt: &prompt,
                    image_url,
                    aspect_ratio: "1:1",
                };
                self.post_model(IMAGE_MODEL_ID, &body).await
            }
            GenerationKind::Video => {
                let body = VideoModelRequest {
                    text: &prompt,
                    image_url,
                    resolution: "480p",
                    ratio: "adaptive",
                    duration: video_duration(request),
                    seed: rand::random_range(0..VIDEO_SEED_RANGE),
                };
                self.post_model(VIDEO_MODEL_ID, &body).await
            }
        }
    }

    async fn poll_status(&self, job_id: &str) -> Result<StatusReport, ClientError> {
        let response = self
            .authorized(self.client.get(self.request_url(job_id, "status")))
            .send()
            .await
            .map_err(|e| ClientError::Status(e.to_string()))?;

        let response = ensure_success(response).await.map_err(ClientError::Status)?;

        let data: StatusResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Status(format!("Invalid response: {e}")))?;

        debug!(job_id, status = ?data.status, queue_position = ?data.queue_position, "status checked");
        Ok(data.into())
    }

    async fn fetch_result(&self, job_id: &str) -> Result<GenerationOutputs, ClientError> {
        let response = self
            .authorized(self.client.get(self.request_url(job_id, "result")))
            .send()
            .await
            .map_err(|e| ClientError::Result(e.to_string()))?;

        let response = ensure_success(response).await.map_err(|msg| {
            error!(job_id, error = %msg, "failed to get result");
            ClientError::Result(msg)
        })?;

        let data: ResultResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Result(format!("Invalid response: {e}")))?;

        debug!(
            job_id,
            status = ?data.status,
            has_output = data.output.is_some(),
            "result received"
        );

        let outputs = data.into_outputs()?;
        info!(job_id, images = outputs.images.len(), videos = outputs.videos.len(), "outputs normalized");
        Ok(outputs)
    }

    async fn cancel(&self, job_id: &str) -> Result<(), ClientError> {
        let response = self
            .authorized(self.client.post(self.request_url(job_id, "cancel")))
            .send()
            .await
            .map_err(|e| ClientError::Cancel(e.to_string()))?;

        ensure_success(response).await.map_err(ClientError::Cancel)?;
        info!(job_id, "generation request cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;
    use pm_core::{JobStatus, StylePreset};

    type Reply = Arc<Mutex<(StatusCode, Value)>>;

    #[derive(Clone)]
    struct FakeRemote {
        submissions: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
        submit_reply: Reply,
        status_reply: Reply,
        result_reply: Reply,
        cancelled: Arc<Mutex<Vec<String>>>,
    }

    impl FakeRemote {
        fn new() -> Self {
            let ok = |v: Value| Arc::new(Mutex::new((StatusCode::OK, v)));
            Self {
                submissions: Arc::default(),
                submit_reply: ok(json!({
                    "request_id": "req-123",
                    "status_url": "s",
                    "result_url": "r",
                    "cancel_url": "c"
                })),
                status_reply: ok(json!({"request_id": "req-123", "status": "in_queue", "queue_position": 2})),
                result_reply: ok(json!({"request_id": "req-123", "status": "succeeded", "output": {"image": "https://cdn/out.png"}})),
                cancelled: Arc::default(),
            }
        }

        fn set(reply: &Reply, code: StatusCode, body: Value) {
            *reply.lock().unwrap() = (code, body);
        }
    }

    async fn submit(
        State(remote): State<FakeRemote>,
        Path(model): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let model = model.trim_start_matches('/').to_string();
        remote.submissions.lock().unwrap().push((model, auth, body));
        let (code, body) = remote.submit_reply.lock().unwrap().clone();
        (code, Json(body))
    }

    async fn status(State(remote): State<FakeRemote>) -> (StatusCode, Json<Value>) {
        let (code, body) = remote.status_reply.lock().unwrap().clone();
        (code, Json(body))
    }

    async fn result(State(remote): State<FakeRemote>) -> (StatusCode, Json<Value>) {
        let (code, body) = remote.result_reply.lock().unwrap().clone();
        (code, Json(body))
    }

    async fn cancel(State(remote): State<FakeRemote>, Path(id): Path<String>) -> StatusCode {
        remote.cancelled.lock().unwrap().push(id);
        StatusCode::OK
    }

    async fn spawn_remote(remote: FakeRemote) -> RunComfyClient {
        let app = Router::new()
            .route("/v1/models/{*model}", post(submit))
            .route("/v1/requests/{id}/status", get(status))
            .route("/v1/requests/{id}/result", get(result))
            .route("/v1/requests/{id}/cancel", post(cancel))
            .with_state(remote);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RunComfyClient::new(RunComfyConfig {
            base_url: format!("http://{addr}/"),
            api_token: "secret".into(),
            timeout: Duration::from_secs(5),
        }).unwrap()
    }

    #[tokio::test]
    async fn test_submit_image() {
        let remote = FakeRemote::new();
        let client = spawn_remote(remote.clone()).await;

        let request = GenerationRequest::image(StylePreset::Superhero, Some("wearing sunglasses".into()));
        let id = client.submit("https://cdn/in.png", &request).await.unwrap();
        assert_eq!(id, "req-123");

        let submissions = remote.submissions.lock().unwrap();
        let (model, auth, body) = &submissions[0];
        assert_eq!(model, IMAGE_MODEL_ID);
        assert_eq!(auth.as_deref(), Some("Bearer secret"));
        assert_eq!(body["image_url"], "https://cdn/in.png");
        assert_eq!(body["aspect_ratio"], "1:1");
        assert_eq!(body["prompt"], request.full_prompt());
    }

    #[tokio::test]
    async fn test_submit_video_with_bare_style_prompt() {
        let remote = FakeRemote::new();
        let client = spawn_remote(remote.clone()).await;

        let request = GenerationRequest::video(StylePreset::Anime, None, 3).unwrap();
        client.submit("https://cdn/in.png", &request).await.unwrap();

        let submissions = remote.submissions.lock().unwrap();
        let (model, _, body) = &submissions[0];
        assert_eq!(model, VIDEO_MODEL_ID);
        assert_eq!(body["text"], StylePreset::Anime.prompt_fragment());
        assert_eq!(body["duration"], 3);
        assert_eq!(body["resolution"], "480p");
        assert!(body["seed"].as_u64().unwrap() < VIDEO_SEED_RANGE as u64);
    }

    #[tokio::test]
    async fn test_submit_rejected_keeps_remote_text() {
        let remote = FakeRemote::new();
        FakeRemote::set(&remote.submit_reply, StatusCode::UNAUTHORIZED, json!({"detail": "bad token"}));
        let client = spawn_remote(remote).await;

        let request = GenerationRequest::image(StylePreset::Custom, None);
        match client.submit("https://cdn/in.png", &request).await {
            Err(ClientError::Submission(msg)) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("bad token"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_without_request_id() {
        let remote = FakeRemote::new();
        FakeRemote::set(&remote.submit_reply, StatusCode::OK, json!({"status_url": "s"}));
        let client = spawn_remote(remote).await;

        let request = GenerationRequest::image(StylePreset::Custom, None);
        let err = client.submit("https://cdn/in.png", &request).await.unwrap_err();
        assert!(matches!(err, ClientError::Submission(_)));
    }

    #[tokio::test]
    async fn test_poll_status() {
        let remote = FakeRemote::new();
        let client = spawn_remote(remote.clone()).await;

        let report = client.poll_status("req-123").await.unwrap();
        assert_eq!(report.status, JobStatus::Queued);
        assert_eq!(report.queue_position, Some(2));

        FakeRemote::set(&remote.status_reply, StatusCode::INTERNAL_SERVER_ERROR, json!("boom"));
        let err = client.poll_status("req-123").await.unwrap_err();
        assert!(matches!(err, ClientError::Status(_)));
    }

    #[tokio::test]
    async fn test_fetch_result() {
        let remote = FakeRemote::new();
        let client = spawn_remote(remote.clone()).await;

        let outputs = client.fetch_result("req-123").await.unwrap();
        assert_eq!(outputs.images, vec!["https://cdn/out.png"]);

        FakeRemote::set(&remote.result_reply, StatusCode::OK, json!({"status": "succeeded", "output": {}}));
        let err = client.fetch_result("req-123").await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyResult));

        FakeRemote::set(&remote.result_reply, StatusCode::NOT_FOUND, json!("missing"));
        let err = client.fetch_result("req-123").await.unwrap_err();
        assert!(matches!(err, ClientError::Result(_)));
    }

    #[tokio::test]
    async fn test_cancel() {
        let remote = FakeRemote::new();
        let client = spawn_remote(remote.clone()).await;

        client.cancel("req-9").await.unwrap();
        assert_eq!(remote.cancelled.lock().unwrap().as_slice(), ["req-9".to_string()]);
    }

    #[test]
    fn test_video_duration_clamped_to_model_range() {
        let mut request = GenerationRequest::video(StylePreset::Anime, None, 10).unwrap();
        assert_eq!(video_duration(&request), 10);
        request.duration = Some(15);
        assert_eq!(video_duration(&request), 12);
        request.duration = None;
        assert_eq!(video_duration(&request), MIN_VIDEO_DURATION);
    }
}
