mod routes;
pub mod schemas;

use std::net::SocketAddr;
use std::sync::Arc;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use log::info;
use tokio::net::TcpListener;
use pm_core::MAX_UPLOAD_BYTES;
use crate::backend::routes::api_routes;
use crate::studio::Studio;

/// Room for the multipart framing and text fields around a maximum size upload
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 2 * 1024 * 1024;

pub fn router(studio: Arc<Studio>) -> Router {
    Router::new()
        .merge(api_routes())
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(studio)
}

pub async fn serve(port: u16, studio: Arc<Studio>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Starting backend server on port {}", port);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(studio)).await?;

    Ok(())
}
