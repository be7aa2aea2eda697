//! HTTP server lifecycle management.
//!
//! Provides [`start_server`], which binds to a TCP port and serves the
//! router until `Ctrl-C` is received, then drains in-flight requests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;

use crate::router::{DEFAULT_REQUEST_TIMEOUT, build_router_with_timeout};
use crate::state::AppState;

/// Listener configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
    /// Per-request deadline.
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 3000,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Start the API server.
///
/// Binds to the configured address, builds the router, and serves
/// requests until `Ctrl-C`. Returns `Ok(())` on clean shutdown.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid or cannot be
/// bound, or [`ServerError::Serve`] on a fatal I/O error while serving.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    let router = build_router_with_timeout(state, config.request_timeout);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "Pokespawn API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("Pokespawn API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl-C; shutting down");
        return;
    }
    info!("Shutdown signal received");
}

/// Errors that can occur when starting or running the API server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pokespawn_core::{Engine, GameConfig};
    use pokespawn_db::{MemoryStore, Store};

    use super::*;

    #[tokio::test]
    async fn invalid_host_is_a_bind_error() {
        let engine = Engine::new(Store::from(MemoryStore::new()), &GameConfig::default()).unwrap();
        let config = ServerConfig {
            host: String::from("not an address"),
            ..ServerConfig::default()
        };
        let result = start_server(&config, Arc::new(AppState::new(engine))).await;
        assert!(matches!(result, Err(ServerError::Bind(_))));
    }
}
