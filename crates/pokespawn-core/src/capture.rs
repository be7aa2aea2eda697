//! Capture and user access.
//!
//! Capture moves a pokemon from the world into a user's collection. The
//! two stores are not updated transactionally: the collection append runs
//! first and the world delete second, so a failure between them leaves a
//! duplicate rather than losing the pokemon.

use chrono::{DateTime, Utc};
use pokespawn_db::Store;
use pokespawn_types::{CapturedPokemon, PokemonId, User, UserId};

use crate::error::CoreError;

/// Move `pokemon_id` from the world into `user_id`'s collection.
///
/// Returns the user as stored after the append.
///
/// # Errors
///
/// Returns [`CoreError::NotFound`] if the pokemon is not in the world and
/// [`CoreError::StoreUnavailable`] if any store call fails. A failed delete
/// after a successful append is still reported as an error.
pub async fn capture(
    store: &Store,
    user_id: &UserId,
    pokemon_id: PokemonId,
    now: DateTime<Utc>,
) -> Result<User, CoreError> {
    let pokemon = store
        .get_pokemon(pokemon_id)
        .await?
        .ok_or(CoreError::NotFound(pokemon_id))?;

    let captured = CapturedPokemon::from_pokemon(&pokemon, now);
    store
        .append_captured(user_id, std::slice::from_ref(&captured))
        .await?;

    if let Err(err) = store.delete_pokemon(pokemon_id).await {
        tracing::warn!(
            %user_id,
            %pokemon_id,
            error = %err,
            "Captured pokemon is still in the world"
        );
        return Err(err.into());
    }

    tracing::info!(%user_id, %pokemon_id, kind = %pokemon.kind, "Pokemon captured");

    let user = store.get_user(user_id).await?.unwrap_or_else(|| User {
        id: user_id.clone(),
        collection: vec![captured],
    });
    Ok(user)
}

/// Fetch a user, creating an empty one on first access.
///
/// An existing collection is never overwritten.
///
/// # Errors
///
/// Returns [`CoreError::StoreUnavailable`] if a store call fails.
pub async fn get_or_create_user(store: &Store, user_id: &UserId) -> Result<User, CoreError> {
    if let Some(user) = store.get_user(user_id).await? {
        return Ok(user);
    }

    store.insert_user_if_absent(user_id).await?;
    tracing::info!(%user_id, "Created user");

    let user = store
        .get_user(user_id)
        .await?
        .unwrap_or_else(|| User::new(user_id.clone()));
    Ok(user)
}
