//! subcat-api - Read-only substance catalog query service
//!
//! Serves the catalog written by subcat-sync. Opens the database read-only;
//! the sync job may run against the same file concurrently.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use subcat_api::{build_router, AppState};
use subcat_common::config::{resolve_config_path, resolve_database_path, TomlConfig};
use subcat_common::db::connect_readonly;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "subcat-api", version, about = "Serve the substance catalog over HTTP")]
struct Args {
    /// Path to TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(long, env = "SUBCAT_API_HOST")]
    host: Option<String>,

    /// Listen port (overrides config)
    #[arg(long, env = "SUBCAT_API_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let config = TomlConfig::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting subcat-api v{}", env!("CARGO_PKG_VERSION"));
    if !config_path.exists() {
        warn!("Config file not found at {}, using defaults", config_path.display());
    }

    let db_path = resolve_database_path(args.database.as_deref(), &config);
    info!("Database path: {}", db_path.display());

    let pool = match connect_readonly(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let app = build_router(AppState::new(pool));

    let host = args.host.unwrap_or(config.api.host);
    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("subcat-api listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
