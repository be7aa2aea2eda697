//! Type-safe identifier wrappers.
//!
//! Spawned pokemon are keyed by server-generated UUID v7 identifiers so the
//! entity table can never hand out the same ID twice. Users are keyed by
//! whatever opaque string the client supplies.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Longest user identifier accepted from a client.
pub const MAX_USER_ID_LEN: usize = 128;

/// Unique identifier for a spawned pokemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PokemonId(pub Uuid);

impl PokemonId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for PokemonId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PokemonId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PokemonId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<PokemonId> for Uuid {
    fn from(id: PokemonId) -> Self {
        id.0
    }
}

impl FromStr for PokemonId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| IdError::InvalidPokemonId(format!("{s}: {e}")))
    }
}

/// Client-supplied identifier for a player.
///
/// Never empty and at most [`MAX_USER_ID_LEN`] bytes; construct through
/// [`FromStr`] to get that guarantee.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserId(String);

impl UserId {
    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdError::InvalidUserId(String::from("user id is empty")));
        }
        if trimmed.len() > MAX_USER_ID_LEN {
            return Err(IdError::InvalidUserId(format!(
                "user id exceeds {MAX_USER_ID_LEN} bytes"
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }
}

/// Errors produced when parsing identifiers from client input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The string is not a valid pokemon UUID.
    #[error("invalid pokemon id: {0}")]
    InvalidPokemonId(String),

    /// The string is not an acceptable user identifier.
    #[error("invalid user id: {0}")]
    InvalidUserId(String),
}
