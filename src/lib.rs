//! gameshelf - a small game store REST API.
//!
//! Accounts with login lockout, a game catalog, per-account game libraries,
//! JWT bearer authentication, per-client rate limiting and in-process
//! metrics in Prometheus text format.

pub mod account;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod web;

pub use account::{Account, AccountError, AccountService, AccountStatus, Role};
pub use config::Config;
pub use db::Database;
pub use error::{Result, ShelfError};
pub use metrics::MetricsRegistry;
pub use rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimiter};
