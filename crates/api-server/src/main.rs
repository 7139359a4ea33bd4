//! API Server for task lists
//!
//! This is the main entry point for the Rust backend.
//! It provides the REST API on `TASKS_BIND_ADDR` (port 8081 by default).

mod config;
mod routes;
mod state;

use anyhow::Context;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::task_list::router())
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api_server=debug,tasklist_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!("Using task list store: {:?}", config.store);

    let app_state = AppState::new(&config.store)
        .await
        .context("Failed to initialize application state")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("REST API listening on {}", config.bind_addr);

    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("REST API server failed")?;

    Ok(())
}
