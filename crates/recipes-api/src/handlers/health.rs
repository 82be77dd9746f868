//! Health check handler

use axum::{response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub message: String,
    pub version: String,
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        message: "Healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
