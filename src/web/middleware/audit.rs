//! Audit trail for requests that change data.
//!
//! Every POST, PUT, PATCH and DELETE is logged under the `audit` target with
//! the caller, the action, the outcome and how long it took. Rejected and
//! failed requests are logged too.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use super::auth::bearer_token;
use crate::auth::TokenIssuer;

/// Log target for audit lines.
pub const AUDIT_TARGET: &str = "audit";

fn is_mutation(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Account id from a verifiable bearer token, or `"anonymous"`.
fn caller(issuer: &TokenIssuer, req: &Request) -> String {
    bearer_token(req.headers())
        .and_then(|token| issuer.verify(token).ok())
        .map(|claims| claims.sub)
        .unwrap_or_else(|| "anonymous".to_string())
}

pub async fn audit(
    State(issuer): State<Arc<TokenIssuer>>,
    req: Request,
    next: Next,
) -> Response {
    if !is_mutation(req.method()) {
        return next.run(req).await;
    }

    let start = Instant::now();
    let account_id = caller(&issuer, &req);
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        target: AUDIT_TARGET,
        account_id = %account_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Request audited"
    );
    response
}
