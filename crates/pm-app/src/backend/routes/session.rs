use std::sync::Arc;
use axum::Json;
use axum::extract::State;
use pm_core::{GenerationKind, StylePreset};
use crate::backend::schemas::{CreditCosts, SessionResponse, StyleInfo, SuccessResponse};
use crate::studio::Studio;

pub async fn get_session(State(studio): State<Arc<Studio>>) -> Json<SessionResponse> {
    Json(SessionResponse {
        success: true,
        credits: studio.credits(),
        costs: CreditCosts {
            image: GenerationKind::Image.cost(),
            video: GenerationKind::Video.cost(),
        },
        styles: StylePreset::all().into_iter().map(StyleInfo::from).collect(),
        history: studio.history().await,
    })
}

pub async fn clear_history(State(studio): State<Arc<Studio>>) -> Json<SuccessResponse> {
    studio.clear_history().await;
    Json(SuccessResponse { success: true })
}

pub async fn reset_credits(State(studio): State<Arc<Studio>>) -> Json<SuccessResponse> {
    studio.reset_credits();
    Json(SuccessResponse { success: true })
}
