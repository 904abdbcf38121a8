use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::ValidationError;
use crate::style::StylePreset;

pub const INITIAL_CREDITS: u64 = 1000;
pub const IMAGE_GENERATION_COST: u64 = 10;
pub const VIDEO_GENERATION_COST: u64 = 100;

/// Accepted video length in seconds, inclusive
pub const MIN_VIDEO_DURATION: u8 = 3;
pub const MAX_VIDEO_DURATION: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Image,
    Video,
}

impl GenerationKind {
    /// Credits debited per attempt
    pub fn cost(&self) -> u64 {
        match self {
            Self::Image => IMAGE_GENERATION_COST,
            Self::Video => VIDEO_GENERATION_COST,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// A validated generation request. Video requests always carry a duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub kind: GenerationKind,
    pub style: StylePreset,
    pub prompt: Option<String>,
    pub duration: Option<u8>,
}

impl GenerationRequest {
    pub fn image(style: StylePreset, prompt: Option<String>) -> Self {
        Self {
            kind: GenerationKind::Image,
            style,
            prompt: normalize_prompt(prompt),
            duration: None,
        }
    }

    pub fn video(style: StylePreset, prompt: Option<String>, duration: i64) -> Result<Self, ValidationError> {
        let duration = validate_duration(duration)?;
        Ok(Self {
            kind: GenerationKind::Video,
            style,
            prompt: normalize_prompt(prompt),
            duration: Some(duration),
        })
    }

    /// Prompt sent to the remote model
    pub fn full_prompt(&self) -> String {
        self.style.build_prompt(self.prompt.as_deref())
    }

    pub fn cost(&self) -> u64 {
        self.kind.cost()
    }
}

fn normalize_prompt(prompt: Option<String>) -> Option<String> {
    prompt
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

pub fn validate_duration(duration: i64) -> Result<u8, ValidationError> {
    if duration < MIN_VIDEO_DURATION as i64 || duration > MAX_VIDEO_DURATION as i64 {
        return Err(ValidationError::DurationOutOfRange(duration));
    }
    Ok(duration as u8)
}

/// Parse a duration form field
pub fn parse_duration(raw: Option<&str>) -> Result<u8, ValidationError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingDuration)?;

    let value: i64 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidDuration(raw.to_string()))?;

    validate_duration(value)
}

/// Output URLs grouped by media type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutputs {
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

impl GenerationOutputs {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len() + self.videos.len()
    }
}

/// A finished generation, as kept in the session history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub id: Uuid,
    pub job_id: String,
    pub kind: GenerationKind,
    pub style: StylePreset,
    pub prompt: Option<String>,
    pub duration: Option<u8>,
    pub outputs: GenerationOutputs,
    pub created_at: DateTime<Utc>,
}

impl GenerationResult {
    pub fn new(job_id: impl Into<String>, request: &GenerationRequest, outputs: GenerationOutputs) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id: job_id.into(),
            kind: request.kind,
            style: request.style,
            prompt: request.prompt.clone(),
            duration: request.duration,
            outputs,
            created_at: Utc::now(),
        }
    }
}
