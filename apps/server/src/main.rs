//! # Quincho POS Server
//!
//! The HTTP entry point: loads configuration, opens the database, bootstraps
//! the admin user, and serves the JSON API.

mod config;
mod error;
mod export;
mod gateway;
mod routes;
mod state;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use quincho_db::{Database, DbConfig};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real deployments set the environment directly.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quincho_server=debug,quincho_db=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load().context("Failed to load configuration")?;

    if let Some(dir) = std::path::Path::new(&config.database_path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        }
    }

    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .context("Failed to open database")?;

    db.users()
        .ensure_admin(&config.admin_username, &config.admin_password)
        .await
        .context("Failed to bootstrap admin user")?;

    let port = config.port;
    let app = routes::router(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    info!(port, "Quincho server listening");

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
