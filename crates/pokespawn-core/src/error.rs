//! Error taxonomy for engine operations.
//!
//! Callers only ever see three kinds of failure: the thing they asked for
//! does not exist, the store could not be reached, or the request itself
//! was malformed.

use pokespawn_db::DbError;
use pokespawn_types::PokemonId;

/// Errors returned by [`Engine`](crate::engine::Engine) operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested pokemon does not exist in the world.
    #[error("pokemon not found: {0}")]
    NotFound(PokemonId),

    /// A storage call failed.
    #[error("store unavailable: {source}")]
    StoreUnavailable {
        /// The underlying storage error.
        #[from]
        source: DbError,
    },

    /// Coordinates or identifiers supplied by the client are unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

