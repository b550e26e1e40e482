//! HTTP surface: Prometheus metrics and the leaderboard as JSON.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use lava_leaderboard_ingestion::SyncController;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

async fn metrics_handler(
    State(controller): State<Arc<SyncController>>,
) -> Result<impl IntoResponse, StatusCode> {
    match controller.metrics().gather() {
        Ok(body) => Ok((StatusCode::OK, body)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

async fn leaderboard_handler(State(controller): State<Arc<SyncController>>) -> impl IntoResponse {
    Json(controller.view().await)
}

/// Routes served alongside the sync loop.
pub fn router(controller: Arc<SyncController>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .layer(CorsLayer::permissive())
        .with_state(controller)
}

/// Bind `addr` and serve in the background.
pub async fn start_http_server(addr: &str, controller: Arc<SyncController>) -> anyhow::Result<()> {
    let app = router(controller);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    });

    Ok(())
}
