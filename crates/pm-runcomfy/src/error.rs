use thiserror::Error;
use pm_core::JobStatus;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Setup(String),
    #[error("Generation request failed: {0}")]
    Submission(String),
    #[error("Status check failed: {0}")]
    Status(String),
    #[error("Failed to get result: {0}")]
    Result(String),
    #[error("Failed to cancel request: {0}")]
    Cancel(String),
    #[error("Generation {}{}", .status.as_str(), failure_detail(.message))]
    GenerationFailed {
        status: JobStatus,
        message: Option<String>,
    },
    #[error("Generation timeout after {attempts} status checks")]
    Timeout { attempts: u32 },
    #[error("No results returned")]
    EmptyResult,
}

fn failure_detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}
