use std::sync::Arc;
use axum::Router;
use axum::routing::{delete, get, post};
use crate::backend::routes::generate::{submit_image, submit_video};
use crate::backend::routes::session::{clear_history, get_session, reset_credits};
use crate::backend::routes::status::{cancel_run, check_status};
use crate::backend::routes::upload::upload_file;
use crate::studio::Studio;

mod generate;
mod session;
mod status;
mod upload;

pub fn api_routes() -> Router<Arc<Studio>> {
    Router::new()
        .route("/api/upload", post(upload_file))
        .route("/api/generate/image", post(submit_image))
        .route("/api/generate/video", post(submit_video))
        .route("/api/status/{run_id}", get(check_status))
        .route("/api/status/{run_id}/cancel", post(cancel_run))
        .route("/api/session", get(get_session))
        .route("/api/history", delete(clear_history))
        .route("/api/credits/reset", post(reset_credits))
}
