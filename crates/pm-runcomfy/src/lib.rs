//! Client for the RunComfy asynchronous model API: submit a job, poll its
//! status, and fetch normalized outputs.

mod api;
mod client;
pub mod error;
pub mod output;
mod poll;
pub mod schemas;

pub use api::GenerationApi;
pub use client::{DEFAULT_API_URL, IMAGE_MODEL_ID, RunComfyClient, RunComfyConfig, VIDEO_MODEL_ID};
pub use error::ClientError;
pub use poll::{DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS, PollConfig, poll_until_complete};
pub use schemas::StatusReport;
