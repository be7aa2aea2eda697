//! Pokespawn game server.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `pokespawn-config.yaml` (or defaults) and
//!    apply environment overrides
//! 2. Initialize structured logging (tracing)
//! 3. Connect to the configured store
//! 4. Build the engine from the game tuning
//! 5. Serve the HTTP API until `Ctrl-C`

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pokespawn_api::{AppState, ServerConfig, start_server};
use pokespawn_core::{Engine, ServiceConfig};
use pokespawn_db::Store;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "pokespawn-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, store connection, or the HTTP
/// server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("pokespawn-server starting");
    info!(
        backend = ?config.store.backend,
        min_nearby = config.game.min_nearby,
        activate_radius_m = config.game.activate_radius_m,
        spawn_radius_m = config.game.spawn_radius_m,
        margin_multiplier = config.game.margin_multiplier,
        "Configuration loaded"
    );

    run(config).await?;

    info!("pokespawn-server stopped");
    Ok(())
}

async fn run(config: ServiceConfig) -> Result<(), ServerError> {
    // 3. Connect to the store.
    let store = Store::connect(&config.store).await?;
    info!(store = store.name(), "Store connected");

    // 4. Build the engine.
    let engine = Engine::new(store, &config.game)?;
    info!(rules = ?engine.rules(), "Engine ready");

    // 5. Serve.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        request_timeout: Duration::from_millis(config.server.request_timeout_ms),
    };
    start_server(&server_config, Arc::new(AppState::new(engine))).await?;
    Ok(())
}

/// Load configuration from `POKESPAWN_CONFIG` or `pokespawn-config.yaml`.
///
/// A missing file means defaults; environment overrides apply either way.
fn load_config() -> Result<ServiceConfig, ServerError> {
    let path = std::env::var("POKESPAWN_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<ServiceConfig, ServerError> {
    if path.exists() {
        Ok(ServiceConfig::from_file(path)?)
    } else {
        // Logging is not up yet.
        eprintln!("config file {} not found, using defaults", path.display());
        Ok(ServiceConfig::from_env()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = load_config_from(Path::new("does-not-exist.yaml"));
        assert!(config.is_ok());
    }

    #[test]
    fn project_config_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_PATH);
        if path.exists() {
            let config = load_config_from(&path);
            assert!(config.is_ok(), "failed to load {}: {config:?}", path.display());
        }
    }
}
