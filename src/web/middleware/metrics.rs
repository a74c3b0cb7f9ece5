//! Request metrics middleware.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::MetricsRegistry;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const HTTP_ERRORS_TOTAL: &str = "http_errors_total";
pub const HTTP_REQUESTS_IN_FLIGHT: &str = "http_requests_in_flight";

/// Register help text for the request metrics.
pub fn describe(metrics: &MetricsRegistry) {
    metrics.describe(HTTP_REQUESTS_TOTAL, "Total HTTP requests");
    metrics.describe(HTTP_REQUEST_DURATION, "HTTP request duration in seconds");
    metrics.describe(HTTP_ERRORS_TOTAL, "HTTP responses with status >= 400");
    metrics.describe(HTTP_REQUESTS_IN_FLIGHT, "HTTP requests currently being served");
    metrics.describe(
        "rate_limited_requests_total",
        "Requests rejected by the rate limiter",
    );
}

/// Holds one `http_requests_in_flight` slot; released on drop so a request
/// whose future is cancelled mid-flight still gives it back.
struct InFlight {
    metrics: Arc<MetricsRegistry>,
}

impl InFlight {
    fn enter(metrics: &Arc<MetricsRegistry>) -> Self {
        metrics.add_gauge(HTTP_REQUESTS_IN_FLIGHT, 1.0, &[]);
        Self {
            metrics: Arc::clone(metrics),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.metrics.add_gauge(HTTP_REQUESTS_IN_FLIGHT, -1.0, &[]);
    }
}

/// Count and time every request. The route label is the matched route
/// template so ids in paths do not multiply series.
pub async fn track_metrics(
    State(metrics): State<Arc<MetricsRegistry>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let in_flight = InFlight::enter(&metrics);
    let response = next.run(req).await;
    drop(in_flight);

    let status = response.status().as_u16().to_string();
    metrics.increment_counter(
        HTTP_REQUESTS_TOTAL,
        &[
            ("method", method.as_str()),
            ("route", route.as_str()),
            ("status", status.as_str()),
        ],
    );
    metrics.record_timing(
        HTTP_REQUEST_DURATION,
        start.elapsed(),
        &[("method", method.as_str()), ("route", route.as_str())],
    );
    if response.status().as_u16() >= 400 {
        metrics.increment_counter(
            HTTP_ERRORS_TOTAL,
            &[("route", route.as_str()), ("status", status.as_str())],
        );
    }

    response
}
