//! Rate limiting middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::rate_limit::RateLimitDecision;
use crate::web::error::{retry_after_secs, ApiError};
use crate::web::handlers::AppState;

/// Client identity: the peer IP, or `"unknown"` when the server was not
/// started with connection info.
fn client_id(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Reject requests over the per-client, per-path budget with 429.
pub async fn rate_limit(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    if !state.rate_limit_enabled {
        return next.run(req).await;
    }

    let client = client_id(&req);
    let endpoint = req.uri().path().to_string();

    match state.rate_limiter.check(&client, &endpoint) {
        RateLimitDecision::Allowed { .. } => next.run(req).await,
        RateLimitDecision::Limited { retry_after } => {
            tracing::warn!(
                client = %client,
                endpoint = %endpoint,
                retry_after_secs = retry_after_secs(retry_after),
                "Rate limit exceeded"
            );
            state.metrics.increment_counter(
                "rate_limited_requests_total",
                &[("endpoint", endpoint.as_str())],
            );
            ApiError::too_many_requests(retry_after).into_response()
        }
    }
}
