use std::process::ExitCode;

use tracing::{error, info, warn};

use gameshelf::auth::Argon2Hasher;
use gameshelf::web::{AppState, WebServer};
use gameshelf::{Config, Database};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = gameshelf::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        gameshelf::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    info!("gameshelf {}", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(&config.database.path).await?;
    let version = db.schema_version().await?;
    info!(path = %config.database.path, version, "Database ready");

    let state = AppState::new(&db, &config, Argon2Hasher::default());

    if config.database.seed_catalog {
        let seeded = state.catalog.seed_defaults().await?;
        if seeded > 0 {
            info!(count = seeded, "Catalog seeded");
        }
    }

    match config.admin.credentials() {
        Some((name, email, password)) => {
            let admin = state.accounts.ensure_admin(name, email, password).await?;
            info!(account_id = %admin.id, email = %admin.email, "Administrator ready");
        }
        None => warn!("No [admin] section configured; no administrator bootstrapped"),
    }

    let server = WebServer::new(&config.server, state, config.rate_limit.cleanup_interval())?;
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );
    server.run().await?;
    Ok(())
}
