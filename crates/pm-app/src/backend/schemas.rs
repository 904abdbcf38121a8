use serde::{Deserialize, Serialize};
use pm_core::{GenerationOutputs, GenerationResult, JobStatus, StylePreset};
use crate::studio::CheckOutcome;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub run_id: String,
    pub message: String,
    /// Present when the request waited for completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<GenerationOutputs>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub success: bool,
    pub request_id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<GenerationOutputs>,
}

impl From<CheckOutcome> for StatusResponse {
    fn from(outcome: CheckOutcome) -> Self {
        Self {
            success: true,
            request_id: outcome.job_id,
            status: outcome.status,
            queue_position: outcome.queue_position,
            outputs: outcome.outputs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StyleInfo {
    pub id: String,
    pub label: String,
    pub icon: String,
}

impl From<StylePreset> for StyleInfo {
    fn from(style: StylePreset) -> Self {
        Self {
            id: style.id().to_string(),
            label: style.label().to_string(),
            icon: style.icon().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditCosts {
    pub image: u64,
    pub video: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub success: bool,
    pub credits: u64,
    pub costs: CreditCosts,
    pub styles: Vec<StyleInfo>,
    pub history: Vec<GenerationResult>,
}
