//! Error types for the storage layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] and [`fred`] errors. Every variant is a transport or backend
//! failure from the caller's point of view: absence of a record is never an
//! error and is reported as `None` instead.

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value could not be decoded into a record.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// The backend refused the operation (used by the in-memory store to
    /// simulate outages).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
