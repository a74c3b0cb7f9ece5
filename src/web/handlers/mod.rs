//! API handlers.

pub mod auth;
pub mod games;
pub mod health;
pub mod library;
pub mod users;

pub use auth::*;
pub use games::*;
pub use health::*;
pub use library::*;
pub use users::*;

use std::sync::Arc;

use crate::account::{AccountRepository, AccountService, LockoutPolicy};
use crate::auth::{Argon2Hasher, TokenConfig, TokenIssuer};
use crate::catalog::{CatalogService, GameRepository};
use crate::config::Config;
use crate::db::Database;
use crate::library::{LibraryRepository, LibraryService};
use crate::metrics::MetricsRegistry;
use crate::rate_limit::{RateLimitPolicy, RateLimiter};

/// Account service as wired into the HTTP layer.
pub type Accounts = AccountService<AccountRepository, Argon2Hasher>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<Accounts>,
    pub catalog: CatalogService,
    pub library: LibraryService,
    pub rate_limiter: Arc<RateLimiter>,
    pub metrics: Arc<MetricsRegistry>,
    pub rate_limit_enabled: bool,
}

impl AppState {
    /// Wire services over `db` from configuration.
    pub fn new(db: &Database, config: &Config, hasher: Argon2Hasher) -> Self {
        let pool = db.pool().clone();
        let accounts = AccountService::new(
            AccountRepository::new(pool.clone()),
            hasher,
            TokenIssuer::new(TokenConfig::from(&config.auth)),
            LockoutPolicy::from(&config.auth),
        );

        Self {
            accounts: Arc::new(accounts),
            catalog: CatalogService::new(GameRepository::new(pool.clone())),
            library: LibraryService::new(
                LibraryRepository::new(pool.clone()),
                GameRepository::new(pool),
            ),
            rate_limiter: Arc::new(RateLimiter::new(RateLimitPolicy::from(&config.rate_limit))),
            metrics: Arc::new(MetricsRegistry::new()),
            rate_limit_enabled: config.rate_limit.enabled,
        }
    }

    /// Issuer used by the bearer token extractors.
    pub fn token_issuer(&self) -> Arc<TokenIssuer> {
        Arc::new(self.accounts.tokens().clone())
    }
}
