//! Gatekeeper Server
//!
//! HTTP front end for the authentication engine.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gk_auth::{MemoryStore, Stores};
use gk_core::config::AppConfig;
use gk_db::Database;

mod error;
mod middleware;
mod routes;
mod state;

use routes::build_router;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        multi_tenancy = config.features.multi_tenancy,
        "Starting Gatekeeper"
    );

    if config.auth.uses_default_secret() {
        warn!("JWT_SECRET_KEY is not set; tokens are signed with the built-in default secret");
    }

    let stores = match Database::connect(&config.database).await {
        Ok(db) => {
            info!("Connected to database");
            db.stores()
        }
        Err(e) => {
            warn!("Failed to connect to database: {}. Running with an empty in-memory store.", e);
            Stores::from_backend(Arc::new(MemoryStore::new()))
        }
    };

    let app = build_router(AppState::new(&config, stores));

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,gk_server=debug,gk_auth=debug,tower_http=debug".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
