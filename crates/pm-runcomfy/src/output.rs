//! Normalization of the model output payload.
//!
//! Models report their outputs under either a singular key (`image`,
//! `video`) or a plural one (`images`, `videos`). Both shapes collapse into
//! plain URL lists; the plural key wins when both are present.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use pm_core::GenerationOutputs;

/// Output object as returned by the result endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
    /// Model specific keys we do not interpret
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// One media slot of the output, after resolving singular/plural keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputField {
    Many(Vec<String>),
    One(String),
    Absent,
}

impl OutputField {
    pub fn resolve(plural: Option<Vec<String>>, singular: Option<String>) -> Self {
        match (plural, singular) {
            (Some(many), _) => Self::Many(many),
            (None, Some(one)) => Self::One(one),
            (None, None) => Self::Absent,
        }
    }

    pub fn into_urls(self) -> Vec<String> {
        match self {
            Self::Many(urls) => urls,
            Self::One(url) => vec![url],
            Self::Absent => Vec::new(),
        }
    }
}

impl RawOutput {
    pub fn normalize(self) -> GenerationOutputs {
        GenerationOutputs {
            images: OutputField::resolve(self.images, self.image).into_urls(),
            videos: OutputField::resolve(self.videos, self.video).into_urls(),
        }
    }
}
