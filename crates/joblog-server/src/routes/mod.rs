//! HTTP route handlers.

pub mod logs;

use crate::state::AppState;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Routes mounted under `/api`.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/logs/{owner}/{repo}/{job_id}", get(logs::document))
        .route(
            "/logs/{owner}/{repo}/{job_id}/decorations",
            get(logs::decorations),
        )
        .route("/logs/{owner}/{repo}/{job_id}/model", get(logs::model))
        .route("/health", get(health))
}
