//! Liveness and metrics endpoints.

use axum::{extract::State, http::header::CONTENT_TYPE, response::IntoResponse, Json};
use std::sync::Arc;

use super::AppState;
use crate::web::dto::HealthResponse;

/// Content type of the Prometheus text exposition format.
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health/ping
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /metrics
pub async fn render_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ([(CONTENT_TYPE, METRICS_CONTENT_TYPE)], state.metrics.render())
}
