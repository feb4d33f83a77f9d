//! # EcoFinds API
//!
//! HTTP server for the marketplace.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Server                                     │
//! │                                                                         │
//! │  Web / mobile ───► HTTP (8080) ───► Routes ───► ecofinds-db ───► SQLite │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ecofinds_api::{app, ApiConfig, AppState};
use ecofinds_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (RUST_LOG overrides the default filter)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_target(true)
        .init();

    info!("Starting EcoFinds API server...");

    // Load configuration
    let config = ApiConfig::load().context("failed to load configuration")?;
    info!(
        environment = %config.environment,
        port = config.server.port,
        db_path = %config.database.path,
        "Configuration loaded"
    );
    if config.is_development() {
        warn!("Running in development mode");
    }

    // Open the database (runs migrations)
    if let Some(parent) = Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let db_config = DbConfig::new(&config.database.path)
        .max_connections(config.database.max_connections)
        .run_migrations(config.database.run_migrations);
    let db = Database::new(db_config)
        .await
        .context("failed to open database")?;

    let addr = config.bind_address()?;
    let state = Arc::new(AppState::new(config, db.clone()));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
