//! The spawn/resolve/capture engine.
//!
//! [`Engine`] ties the store, the validated [`SpawnRules`] and a seeded
//! RNG together. One engine is shared by every request handler.
//!
//! # Resolve pipeline
//!
//! ```text
//! scan -> plan spawns -> persist spawns
//!      -> re-scan -> select nearest -> prune
//!      -> top up density if the prune removed anything
//! ```
//!
//! Nothing is locked around the store. Concurrent queries over the same
//! area may both spawn, and may both prune the same pokemon; deletes are
//! idempotent, so the second prune is a no-op.

use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use pokespawn_db::Store;
use pokespawn_types::{GeoPoint, NearbyPokemon, Pokemon, PokemonId, User, UserId};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::capture;
use crate::config::{ConfigError, GameConfig, SpawnRules};
use crate::error::CoreError;
use crate::geometry::degrees_to_meters;
use crate::resolve::{prune, select_nearest};
use crate::spawn::{persist_spawns, plan_spawns};

/// Shared game engine.
pub struct Engine {
    store: Store,
    rules: SpawnRules,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("store", &self.store.name())
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine from game tuning.
    ///
    /// The RNG is seeded from `config.seed` when set, otherwise from the
    /// operating system.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the tuning does not validate.
    pub fn new(store: Store, config: &GameConfig) -> Result<Self, ConfigError> {
        let rules = config.validate()?;
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Ok(Self::with_rng(store, rules, rng))
    }

    /// Build an engine from already validated rules and an explicit RNG.
    pub const fn with_rng(store: Store, rules: SpawnRules, rng: StdRng) -> Self {
        Self {
            store,
            rules,
            rng: Mutex::new(rng),
        }
    }

    /// The backing store.
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// The active spawn rules.
    pub const fn rules(&self) -> &SpawnRules {
        &self.rules
    }

    /// Make sure the area around `(latitude, longitude)` is populated,
    /// then return the nearest pokemon.
    ///
    /// Former nearest candidates inside the margin radius are pruned along
    /// the way. `None` means the world is empty even after spawning, which
    /// only happens when every spawn write failed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] for non-finite coordinates and
    /// [`CoreError::StoreUnavailable`] if a scan fails. Individual spawn
    /// and prune failures are logged, not returned.
    pub async fn resolve_nearby(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<NearbyPokemon>, CoreError> {
        let center = GeoPoint::new(latitude, longitude);
        if !center.is_finite() {
            return Err(CoreError::InvalidInput(format!(
                "coordinates must be finite, got ({latitude}, {longitude})"
            )));
        }

        let existing = self.store.scan_pokemon().await?;
        self.maintain_density(&existing, center).await;

        let world = self.store.scan_pokemon().await?;
        let resolution = select_nearest(&world, center, &self.rules);
        let pruned = prune(&self.store, &resolution.to_prune).await;

        if !pruned.is_empty() {
            let survivors: Vec<Pokemon> = world
                .into_iter()
                .filter(|p| !pruned.contains(&p.id))
                .collect();
            self.maintain_density(&survivors, center).await;
        }

        if let Some(nearest) = &resolution.nearest {
            tracing::debug!(
                pokemon_id = %nearest.pokemon.id,
                distance_m = degrees_to_meters(nearest.distance),
                should_activate = nearest.should_activate,
                "Resolved nearest pokemon"
            );
        }
        Ok(resolution.nearest)
    }

    /// Move a pokemon into a user's collection.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the pokemon is gone, or
    /// [`CoreError::StoreUnavailable`] on store failure.
    pub async fn capture(&self, user_id: &UserId, pokemon_id: PokemonId) -> Result<User, CoreError> {
        capture::capture(&self.store, user_id, pokemon_id, Utc::now()).await
    }

    /// Fetch a user, creating an empty one on first access.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreUnavailable`] on store failure.
    pub async fn get_or_create_user(&self, user_id: &UserId) -> Result<User, CoreError> {
        capture::get_or_create_user(&self.store, user_id).await
    }

    /// Remove a pokemon from the world. Removing an absent pokemon succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreUnavailable`] on store failure.
    pub async fn delete_pokemon(&self, pokemon_id: PokemonId) -> Result<(), CoreError> {
        self.store.delete_pokemon(pokemon_id).await?;
        tracing::info!(%pokemon_id, "Deleted pokemon");
        Ok(())
    }

    async fn maintain_density(&self, existing: &[Pokemon], center: GeoPoint) {
        let planned = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            plan_spawns(existing, center, &self.rules, &mut *rng, Utc::now())
        };
        persist_spawns(&self.store, planned).await;
    }
}
