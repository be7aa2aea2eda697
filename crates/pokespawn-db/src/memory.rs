//! In-process store backed by ordered maps.
//!
//! Used by the test suites and for running the server without external
//! services. Scans return pokemon in ascending id order, which makes the
//! resolver's first-seen tie policy deterministic under test.
//!
//! The store can be told to fail individual deletes or to reject every
//! call, so callers can exercise their partial-failure handling.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use pokespawn_types::{CapturedPokemon, Pokemon, PokemonId, User, UserId};
use tokio::sync::RwLock;

use crate::error::DbError;

#[derive(Debug, Default)]
struct Tables {
    pokemon: BTreeMap<PokemonId, Pokemon>,
    users: BTreeMap<UserId, User>,
    failing_deletes: BTreeSet<PokemonId>,
    unavailable: bool,
}

impl Tables {
    fn check_available(&self) -> Result<(), DbError> {
        if self.unavailable {
            Err(DbError::Unavailable(String::from("memory store marked unavailable")))
        } else {
            Ok(())
        }
    }
}

/// Shared in-memory tables. Cloning yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a pokemon by id.
    pub async fn get_pokemon(&self, id: PokemonId) -> Result<Option<Pokemon>, DbError> {
        let tables = self.inner.read().await;
        tables.check_available()?;
        Ok(tables.pokemon.get(&id).cloned())
    }

    /// Every pokemon in the world, ordered by id.
    pub async fn scan_pokemon(&self) -> Result<Vec<Pokemon>, DbError> {
        let tables = self.inner.read().await;
        tables.check_available()?;
        Ok(tables.pokemon.values().cloned().collect())
    }

    /// Insert or replace a pokemon.
    pub async fn put_pokemon(&self, pokemon: &Pokemon) -> Result<(), DbError> {
        let mut tables = self.inner.write().await;
        tables.check_available()?;
        tables.pokemon.insert(pokemon.id, pokemon.clone());
        Ok(())
    }

    /// Remove a pokemon. Removing an absent id succeeds.
    pub async fn delete_pokemon(&self, id: PokemonId) -> Result<(), DbError> {
        let mut tables = self.inner.write().await;
        tables.check_available()?;
        if tables.failing_deletes.contains(&id) {
            return Err(DbError::Unavailable(format!("injected delete failure for {id}")));
        }
        tables.pokemon.remove(&id);
        Ok(())
    }

    /// Look up a user by id.
    pub async fn get_user(&self, id: &UserId) -> Result<Option<User>, DbError> {
        let tables = self.inner.read().await;
        tables.check_available()?;
        Ok(tables.users.get(id).cloned())
    }

    /// Insert or replace a user record.
    pub async fn put_user(&self, user: &User) -> Result<(), DbError> {
        let mut tables = self.inner.write().await;
        tables.check_available()?;
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    /// Create an empty user unless one exists.
    pub async fn insert_user_if_absent(&self, id: &UserId) -> Result<(), DbError> {
        let mut tables = self.inner.write().await;
        tables.check_available()?;
        tables
            .users
            .entry(id.clone())
            .or_insert_with(|| User::new(id.clone()));
        Ok(())
    }

    /// Append to a user's collection, creating the user if absent.
    pub async fn append_captured(
        &self,
        user_id: &UserId,
        items: &[CapturedPokemon],
    ) -> Result<(), DbError> {
        let mut tables = self.inner.write().await;
        tables.check_available()?;
        tables
            .users
            .entry(user_id.clone())
            .or_insert_with(|| User::new(user_id.clone()))
            .collection
            .extend_from_slice(items);
        Ok(())
    }

    /// Make every subsequent delete of `id` fail.
    pub async fn fail_deletes_for(&self, id: PokemonId) {
        self.inner.write().await.failing_deletes.insert(id);
    }

    /// Toggle whole-store unavailability.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.inner.write().await.unavailable = unavailable;
    }

    /// Number of pokemon currently stored.
    pub async fn pokemon_count(&self) -> usize {
        self.inner.read().await.pokemon.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use pokespawn_types::{GeoPoint, PokemonKind};
    use uuid::Uuid;

    use super::*;

    fn pokemon(n: u128) -> Pokemon {
        Pokemon {
            id: PokemonId(Uuid::from_u128(n)),
            kind: PokemonKind::Eevee,
            location: GeoPoint::new(0.0, 0.0),
            spawned_at: Utc::now(),
        }
    }

    fn user_id(s: &str) -> UserId {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn scan_is_ordered_by_id() {
        let store = MemoryStore::new();
        store.put_pokemon(&pokemon(3)).await.ok();
        store.put_pokemon(&pokemon(1)).await.ok();
        store.put_pokemon(&pokemon(2)).await.ok();

        let ids: Vec<u128> = store
            .scan_pokemon()
            .await
            .unwrap_or_default()
            .iter()
            .map(|p| p.id.into_inner().as_u128())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn delete_absent_is_ok() {
        let store = MemoryStore::new();
        let result = store.delete_pokemon(PokemonId::new()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn injected_delete_failure_keeps_record() {
        let store = MemoryStore::new();
        let p = pokemon(7);
        store.put_pokemon(&p).await.ok();
        store.fail_deletes_for(p.id).await;

        assert!(store.delete_pokemon(p.id).await.is_err());
        assert_eq!(store.pokemon_count().await, 1);
    }

    #[tokio::test]
    async fn append_creates_missing_user() {
        let store = MemoryStore::new();
        let id = user_id("gary");
        let item = CapturedPokemon::from_pokemon(&pokemon(9), Utc::now());

        store.append_captured(&id, &[item.clone()]).await.ok();
        store.append_captured(&id, &[item.clone()]).await.ok();

        let user = store.get_user(&id).await.ok().flatten();
        assert_eq!(user.map(|u| u.collection), Some(vec![item.clone(), item]));
    }

    #[tokio::test]
    async fn unavailable_store_rejects_calls() {
        let store = MemoryStore::new();
        store.set_unavailable(true).await;
        assert!(matches!(
            store.scan_pokemon().await,
            Err(DbError::Unavailable(_))
        ));
        store.set_unavailable(false).await;
        assert!(store.scan_pokemon().await.is_ok());
    }
}
