//! Configuration module for gameshelf.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{Result, ShelfError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty = allow any origin without credentials).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Insert the sample games when the catalog is empty.
    #[serde(default = "default_seed_catalog")]
    pub seed_catalog: bool,
}

fn default_db_path() -> String {
    "data/gameshelf.db".to_string()
}

fn default_seed_catalog() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            seed_catalog: default_seed_catalog(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/gameshelf.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Authentication and account security configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to derive the JWT signing key (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Token issuer (`iss` claim).
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Token audience (`aud` claim).
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: u64,
    /// Consecutive failed logins before the account is locked.
    #[serde(default = "default_max_failed_logins")]
    pub max_failed_logins: u32,
    /// Lock duration in minutes after too many failed logins.
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: u64,
}

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_EXPIRY_HOURS: u64 = 24 * 365;

/// Longest accepted lockout: one year, the same cap as an administrative lock.
pub const MAX_LOCKOUT_MINUTES: u64 = 60 * 24 * 365;

fn default_issuer() -> String {
    "gameshelf".to_string()
}

fn default_audience() -> String {
    "gameshelf-clients".to_string()
}

fn default_token_expiry_hours() -> u64 {
    24
}

fn default_max_failed_logins() -> u32 {
    5
}

fn default_lockout_minutes() -> u64 {
    30
}

impl AuthConfig {
    /// Lock duration applied after too many failed logins.
    ///
    /// Capped at [`MAX_LOCKOUT_MINUTES`] even when validation was skipped.
    pub fn lockout_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lockout_minutes.min(MAX_LOCKOUT_MINUTES) as i64)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: default_issuer(),
            audience: default_audience(),
            token_expiry_hours: default_token_expiry_hours(),
            max_failed_logins: default_max_failed_logins(),
            lockout_minutes: default_lockout_minutes(),
        }
    }
}

/// Request rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Whether the rate limiting middleware is installed.
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    /// Maximum requests per client and endpoint within one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Interval between sweeps of expired windows, in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_secs() -> u64 {
    60
}

fn default_cleanup_interval() -> u64 {
    300 // 5 minutes
}

impl RateLimitConfig {
    /// Window length as a `Duration`.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Cleanup interval as a `Duration`.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

/// Administrator account created at startup when all fields are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Initial password.
    #[serde(default)]
    pub password: Option<String>,
}

impl AdminConfig {
    /// Returns `(name, email, password)` if the bootstrap admin is fully configured.
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        match (&self.name, &self.email, &self.password) {
            (Some(name), Some(email), Some(password)) => {
                Some((name.as_str(), email.as_str(), password.as_str()))
            }
            _ => None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Rate limiting configuration.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Bootstrap administrator.
    #[serde(default)]
    pub admin: AdminConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ShelfError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ShelfError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `GAMESHELF_JWT_SECRET`: Override the JWT secret
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("GAMESHELF_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.auth.jwt_secret = jwt_secret;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ShelfError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via GAMESHELF_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if !(1..=MAX_TOKEN_EXPIRY_HOURS).contains(&self.auth.token_expiry_hours) {
            return Err(ShelfError::Config(format!(
                "token_expiry_hours must be between 1 and {MAX_TOKEN_EXPIRY_HOURS}"
            )));
        }
        if !(1..=MAX_LOCKOUT_MINUTES).contains(&self.auth.lockout_minutes) {
            return Err(ShelfError::Config(format!(
                "lockout_minutes must be between 1 and {MAX_LOCKOUT_MINUTES}"
            )));
        }
        if self.auth.max_failed_logins == 0 {
            return Err(ShelfError::Config(
                "max_failed_logins must be greater than 0".to_string(),
            ));
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(ShelfError::Config(
                "rate_limit.max_requests and rate_limit.window_secs must be greater than 0"
                    .to_string(),
            ));
        }
        if self.rate_limit.cleanup_interval_secs == 0 {
            return Err(ShelfError::Config(
                "rate_limit.cleanup_interval_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
