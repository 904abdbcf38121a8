use serde::{Deserialize, Serialize};
use pm_core::{GenerationOutputs, JobStatus};
use crate::error::ClientError;
use crate::output::RawOutput;

/// Body for the image edit model
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageModelRequest<'a> {
    pub prompt: &'a str,
    pub image_url: &'a str,
    pub aspect_ratio: &'a str,
}

/// Body for the image-to-video model. It takes the prompt as `text`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VideoModelRequest<'a> {
    pub text: &'a str,
    pub image_url: &'a str,
    pub resolution: &'a str,
    pub ratio: &'a str,
    pub duration: u8,
    pub seed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub status_url: Option<String>,
    #[serde(default)]
    pub result_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    InQueue,
    InProgress,
    Completed,
    Succeeded,
    Cancelled,
    Failed,
}

impl From<RemoteStatus> for JobStatus {
    fn from(status: RemoteStatus) -> Self {
        match status {
            RemoteStatus::InQueue => JobStatus::Queued,
            RemoteStatus::InProgress => JobStatus::Running,
            RemoteStatus::Completed | RemoteStatus::Succeeded => JobStatus::Completed,
            RemoteStatus::Cancelled => JobStatus::Cancelled,
            RemoteStatus::Failed => JobStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    #[serde(default)]
    pub request_id: String,
    pub status: RemoteStatus,
    #[serde(default)]
    pub queue_position: Option<u32>,
}

/// One status observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: JobStatus,
    pub queue_position: Option<u32>,
}

impl From<StatusResponse> for StatusReport {
    fn from(resp: StatusResponse) -> Self {
        Self {
            status: resp.status.into(),
            queue_position: resp.queue_position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultResponse {
    #[serde(default)]
    pub request_id: String,
    pub status: RemoteStatus,
    #[serde(default)]
    pub output: Option<RawOutput>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ResultResponse {
    /// Normalized outputs, failing when the job did not produce any
    pub fn into_outputs(self) -> Result<GenerationOutputs, ClientError> {
        let status = JobStatus::from(self.status);
        if status.is_failure() {
            return Err(ClientError::GenerationFailed {
                status,
                message: self.error,
            });
        }

        let outputs = self.output.unwrap_or_default().normalize();
        if outputs.is_empty() {
            return Err(ClientError::EmptyResult);
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_vocabulary() {
        let resp: StatusResponse = serde_json::from_str(
            r#"{"request_id": "r1", "status": "in_queue", "queue_position": 4, "status_url": "x"}"#,
        ).unwrap();
        let report = StatusReport::from(resp);
        assert_eq!(report.status, JobStatus::Queued);
        assert_eq!(report.queue_position, Some(4));

        let resp: StatusResponse = serde_json::from_str(r#"{"status": "in_progress"}"#).unwrap();
        assert_eq!(JobStatus::from(resp.status), JobStatus::Running);
    }

    #[test]
    fn test_result_with_images() {
        let resp: ResultResponse = serde_json::from_str(
            r#"{"request_id": "r1", "status": "succeeded", "output": {"images": ["a", "b"]}}"#,
        ).unwrap();
        let outputs = resp.into_outputs().unwrap();
        assert_eq!(outputs.images, vec!["a", "b"]);
    }

    #[test]
    fn test_result_without_outputs_is_an_error() {
        let resp: ResultResponse = serde_json::from_str(
            r#"{"request_id": "r1", "status": "succeeded", "output": {}}"#,
        ).unwrap();
        assert!(matches!(resp.into_outputs(), Err(ClientError::EmptyResult)));

        let resp: ResultResponse = serde_json::from_str(r#"{"status": "succeeded"}"#).unwrap();
        assert!(matches!(resp.into_outputs(), Err(ClientError::EmptyResult)));
    }

    #[test]
    fn test_failed_result_carries_remote_error() {
        let resp: ResultResponse = serde_json::from_str(
            r#"{"status": "failed", "error": "out of memory"}"#,
        ).unwrap();
        match resp.into_outputs() {
            Err(ClientError::GenerationFailed { status, message }) => {
                assert_eq!(status, JobStatus::Failed);
                assert_eq!(message.as_deref(), Some("out of memory"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_video_body_uses_text_field() {
        let body = VideoModelRequest {
            text: "wagging tail",
            image_url: "https://cdn/x.png",
            resolution: "480p",
            ratio: "adaptive",
            duration: 5,
            seed: 7,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["text"], "wagging tail");
        assert!(json.get("prompt").is_none());
    }
}
