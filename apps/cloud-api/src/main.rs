//! # SubTrack Cloud API
//!
//! HTTP server for account sync.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cloud API Server                                 │
//! │                                                                         │
//! │  SubTrack client ───► HTTP (8080) ───► Handlers ───► SQLite            │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                                        JWT Auth                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use subtrack_cloud_api::auth::JwtManager;
use subtrack_cloud_api::routes;
use subtrack_cloud_api::{AppState, CloudConfig, Database};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .init();

    info!("Starting SubTrack Cloud API server...");

    let config = CloudConfig::load()?;
    info!(
        port = config.http_port,
        db_path = %config.database_path,
        "Configuration loaded"
    );

    let db = Database::connect(&config.database_path).await?;

    let jwt = JwtManager::new(
        config.jwt_secret.clone(),
        config.jwt_access_lifetime_secs,
        config.jwt_refresh_lifetime_secs,
    );

    let state = Arc::new(AppState {
        db,
        jwt,
        config: config.clone(),
    });

    let app = routes::router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(?e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(?e, "Failed to install signal handler"),
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
