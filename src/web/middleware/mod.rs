//! Middleware for Web API.

pub mod audit;
pub mod auth;
pub mod cors;
pub mod metrics;
pub mod rate_limit;

pub use audit::audit;
pub use auth::{token_auth, AdminUser, AuthUser};
pub use cors::create_cors_layer;
pub use metrics::track_metrics;
pub use rate_limit::rate_limit;
