pub mod error;
pub mod generation;
pub mod job;
mod style;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub use error::ValidationError;
pub use generation::{
    GenerationKind, GenerationOutputs, GenerationRequest, GenerationResult,
    INITIAL_CREDITS, IMAGE_GENERATION_COST, VIDEO_GENERATION_COST,
    MIN_VIDEO_DURATION, MAX_VIDEO_DURATION,
};
pub use job::{Job, JobStatus};
pub use style::StylePreset;
