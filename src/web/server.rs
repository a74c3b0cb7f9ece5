//! HTTP server for gameshelf.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::{Result, ShelfError};

use super::handlers::AppState;
use super::router::create_router;

/// Web server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    cors_origins: Vec<String>,
    cleanup_interval: Duration,
}

impl WebServer {
    /// Create a new web server. Fails if `host:port` is not a socket address.
    pub fn new(
        config: &ServerConfig,
        app_state: AppState,
        cleanup_interval: Duration,
    ) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse::<SocketAddr>()
            .map_err(|e| {
                ShelfError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    config.host, config.port
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            cors_origins: config.cors_origins.clone(),
            cleanup_interval,
        })
    }

    /// Get the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn router(&self) -> Router {
        create_router(self.app_state.clone(), &self.cors_origins)
    }

    /// Bind, start the rate-limit window cleanup and return the listener.
    async fn bind(&self) -> std::io::Result<TcpListener> {
        let listener = TcpListener::bind(self.addr).await?;

        self.app_state
            .rate_limiter
            .clone()
            .start_cleanup_task(self.cleanup_interval);
        tracing::info!(
            interval_secs = self.cleanup_interval.as_secs(),
            "Rate limit cleanup task started"
        );

        Ok(listener)
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = self.bind().await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        let service = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, service).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let listener = self.bind().await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        let service = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, service).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
