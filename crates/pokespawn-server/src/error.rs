//! Error types for the server binary.
//!
//! [`ServerError`] wraps every failure mode during startup and serving so
//! `main` can propagate with `?`.

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: pokespawn_core::ConfigError,
    },

    /// The storage backend could not be connected.
    #[error("store error: {source}")]
    Store {
        /// The underlying storage error.
        #[from]
        source: pokespawn_db::DbError,
    },

    /// The HTTP server failed to start or stopped with an error.
    #[error("http error: {source}")]
    Http {
        /// The underlying server error.
        #[from]
        source: pokespawn_api::ServerError,
    },
}
