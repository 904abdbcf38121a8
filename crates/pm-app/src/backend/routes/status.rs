use std::sync::Arc;
use axum::Json;
use axum::extract::{Path, State};
use crate::backend::schemas::{StatusResponse, SuccessResponse};
use crate::error::AppError;
use crate::studio::Studio;

pub async fn check_status(
    State(studio): State<Arc<Studio>>,
    Path(run_id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let outcome = studio.check(&run_id).await?;
    Ok(Json(outcome.into()))
}

pub async fn cancel_run(
    State(studio): State<Arc<Studio>>,
    Path(run_id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    studio.cancel(&run_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
