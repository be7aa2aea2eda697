//! `Dragonfly` (Redis-compatible) storage for pokemon and users.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `{pokemon_key}` | Hash | field = pokemon id, value = JSON [`Pokemon`] |
//! | `{user_key}` | Set | ids of every known user |
//! | `{user_key}:{id}:collection` | List | JSON [`CapturedPokemon`] entries, oldest first |
//!
//! Appending to a collection is a single `RPUSH`, so concurrent captures
//! for the same user never overwrite each other.

use fred::prelude::*;
use pokespawn_types::{CapturedPokemon, Pokemon, PokemonId, User, UserId};

use crate::error::DbError;

/// Default hash key holding world pokemon.
pub const DEFAULT_POKEMON_KEY: &str = "pokemon";

/// Default set key holding user ids.
pub const DEFAULT_USER_KEY: &str = "users";

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`] and provides typed operations
/// for the key patterns above.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
    pokemon_key: String,
    user_key: String,
}

impl DragonflyPool {
    /// Connect to `Dragonfly` storing pokemon under `pokemon_key` and users
    /// under `user_key`.
    ///
    /// The URL follows the Redis scheme: `redis://host:port[/db]`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed or a key is
    /// empty. Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect_with_keys(
        url: &str,
        pokemon_key: &str,
        user_key: &str,
    ) -> Result<Self, DbError> {
        if pokemon_key.is_empty() || user_key.is_empty() {
            return Err(DbError::Config(String::from(
                "Dragonfly key names must not be empty",
            )));
        }

        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!(pokemon_key, user_key, "Connected to Dragonfly");
        Ok(Self {
            client,
            pokemon_key: pokemon_key.to_owned(),
            user_key: user_key.to_owned(),
        })
    }

    fn collection_key(&self, user_id: &UserId) -> String {
        format!("{}:{user_id}:collection", self.user_key)
    }

    // =========================================================================
    // Pokemon -- {pokemon_key} hash
    // =========================================================================

    /// Look up a pokemon by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the read fails or
    /// [`DbError::Serialization`] if the stored JSON is invalid.
    pub async fn get_pokemon(&self, id: PokemonId) -> Result<Option<Pokemon>, DbError> {
        let value: Option<String> = self
            .client
            .hget(self.pokemon_key.as_str(), id.to_string().as_str())
            .await?;
        value
            .map(|s| serde_json::from_str(&s).map_err(DbError::from))
            .transpose()
    }

    /// Read every pokemon in the world.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the read or deserialization fails.
    pub async fn scan_pokemon(&self) -> Result<Vec<Pokemon>, DbError> {
        let values: Vec<String> = self.client.hvals(self.pokemon_key.as_str()).await?;
        let mut pokemon = Vec::with_capacity(values.len());
        for v in &values {
            pokemon.push(serde_json::from_str(v)?);
        }
        Ok(pokemon)
    }

    /// Insert or replace a pokemon.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or the write fails.
    pub async fn put_pokemon(&self, pokemon: &Pokemon) -> Result<(), DbError> {
        let json = serde_json::to_string(pokemon)?;
        let id = pokemon.id.to_string();
        let _: u32 = self
            .client
            .hset(self.pokemon_key.as_str(), (id.as_str(), json.as_str()))
            .await?;
        Ok(())
    }

    /// Remove a pokemon. `HDEL` of a missing field is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn delete_pokemon(&self, id: PokemonId) -> Result<(), DbError> {
        let _: u32 = self
            .client
            .hdel(self.pokemon_key.as_str(), id.to_string().as_str())
            .await?;
        Ok(())
    }

    // =========================================================================
    // Users -- {user_key} set + {user_key}:{id}:collection lists
    // =========================================================================

    /// Look up a user and their collection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a read or deserialization fails.
    pub async fn get_user(&self, id: &UserId) -> Result<Option<User>, DbError> {
        let known: bool = self
            .client
            .sismember(self.user_key.as_str(), id.as_str())
            .await?;
        if !known {
            return Ok(None);
        }

        let values: Vec<String> = self.client.lrange(self.collection_key(id), 0, -1).await?;
        let mut collection = Vec::with_capacity(values.len());
        for v in &values {
            collection.push(serde_json::from_str(v)?);
        }
        Ok(Some(User {
            id: id.clone(),
            collection,
        }))
    }

    /// Replace a user record wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or a write fails.
    pub async fn put_user(&self, user: &User) -> Result<(), DbError> {
        let key = self.collection_key(&user.id);
        let _: u32 = self
            .client
            .sadd(self.user_key.as_str(), user.id.as_str())
            .await?;
        let _: u32 = self.client.del(key.as_str()).await?;
        self.push_collection(&key, &user.collection).await
    }

    /// Register a user with an empty collection unless they already exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn insert_user_if_absent(&self, id: &UserId) -> Result<(), DbError> {
        let _: u32 = self.client.sadd(self.user_key.as_str(), id.as_str()).await?;
        Ok(())
    }

    /// Append captured pokemon to a user's collection, registering the user
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or a write fails.
    pub async fn append_captured(
        &self,
        user_id: &UserId,
        items: &[CapturedPokemon],
    ) -> Result<(), DbError> {
        let _: u32 = self
            .client
            .sadd(self.user_key.as_str(), user_id.as_str())
            .await?;
        self.push_collection(&self.collection_key(user_id), items).await
    }

    async fn push_collection(&self, key: &str, items: &[CapturedPokemon]) -> Result<(), DbError> {
        if items.is_empty() {
            return Ok(());
        }
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(serde_json::to_string(item)?);
        }
        let _: u64 = self.client.rpush(key, values).await?;
        Ok(())
    }
}
