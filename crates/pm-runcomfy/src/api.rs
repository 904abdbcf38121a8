use async_trait::async_trait;
use pm_core::{GenerationOutputs, GenerationRequest};
use crate::error::ClientError;
use crate::schemas::StatusReport;

/// Remote job operations of a generation service
#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// Submit a job for the image at `image_url`, returning the remote job id
    async fn submit(&self, image_url: &str, request: &GenerationRequest) -> Result<String, ClientError>;

    /// Single status check
    async fn poll_status(&self, job_id: &str) -> Result<StatusReport, ClientError>;

    /// Outputs of a completed job. Fails with [`ClientError::EmptyResult`]
    /// when the job finished without producing any URL.
    async fn fetch_result(&self, job_id: &str) -> Result<GenerationOutputs, ClientError>;

    async fn cancel(&self, job_id: &str) -> Result<(), ClientError>;
}
