//! Spawn density maintenance.
//!
//! Guarantees that at least `min_nearby` pokemon stand within the spawn
//! radius of a query point. Missing pokemon are placed in the annulus
//! between the margin and spawn radii, so a fresh spawn is never close
//! enough to be captured from where the player already stands.
//!
//! Planning is pure and takes the RNG explicitly; persistence is a
//! separate async step so the RNG never crosses an `.await`.

use chrono::{DateTime, Utc};
use pokespawn_db::Store;
use pokespawn_types::{GeoPoint, Pokemon, PokemonId};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::config::SpawnRules;
use crate::geometry::sample_annulus;

/// Number of pokemon strictly inside the spawn radius of `center`.
pub fn count_within(existing: &[Pokemon], center: GeoPoint, radius: f64) -> usize {
    existing
        .iter()
        .filter(|p| center.planar_distance(p.location) < radius)
        .count()
}

/// Decide which pokemon must be spawned around `center`.
///
/// The count of existing pokemon is taken once; the returned batch tops it
/// up to `min_nearby`. Nothing is written.
pub fn plan_spawns<R: Rng + ?Sized>(
    existing: &[Pokemon],
    center: GeoPoint,
    rules: &SpawnRules,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<Pokemon> {
    let present = count_within(existing, center, rules.spawn_radius());
    let wanted = usize::try_from(rules.min_nearby()).unwrap_or(usize::MAX);
    let missing = wanted.saturating_sub(present);

    let mut planned = Vec::with_capacity(missing);
    for _ in 0..missing {
        let Some(&kind) = rules.kinds().choose(rng) else {
            break;
        };
        let location = sample_annulus(center, rules.margin_radius(), rules.spawn_radius(), rng);
        planned.push(Pokemon {
            id: PokemonId::new(),
            kind,
            location,
            spawned_at: now,
        });
    }
    planned
}

/// Write planned spawns to the store, one at a time.
///
/// A failed write is logged and skipped; the rest of the batch still runs.
/// Returns the pokemon that were actually stored.
pub async fn persist_spawns(store: &Store, planned: Vec<Pokemon>) -> Vec<Pokemon> {
    let attempted = planned.len();
    let mut stored = Vec::with_capacity(attempted);

    for pokemon in planned {
        match store.put_pokemon(&pokemon).await {
            Ok(()) => {
                tracing::debug!(
                    pokemon_id = %pokemon.id,
                    kind = %pokemon.kind,
                    latitude = pokemon.location.latitude,
                    longitude = pokemon.location.longitude,
                    "Spawned pokemon"
                );
                stored.push(pokemon);
            }
            Err(err) => {
                tracing::warn!(pokemon_id = %pokemon.id, error = %err, "Failed to spawn pokemon");
            }
        }
    }

    if attempted > 0 {
        tracing::info!(attempted, stored = stored.len(), "Spawn pass complete");
    }
    stored
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pokespawn_db::MemoryStore;
    use pokespawn_types::PokemonKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rules() -> SpawnRules {
        SpawnRules::new(PokemonKind::ALL.to_vec(), 6, 1.0, 3.0, 10.0).unwrap()
    }

    fn at(lat: f64, lon: f64) -> Pokemon {
        Pokemon {
            id: PokemonId::new(),
            kind: PokemonKind::Eevee,
            location: GeoPoint::new(lat, lon),
            spawned_at: Utc::now(),
        }
    }

    #[test]
    fn empty_world_gets_min_nearby_in_annulus() {
        let rules = rules();
        let center = GeoPoint::new(0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(1);

        let planned = plan_spawns(&[], center, &rules, &mut rng, Utc::now());
        assert_eq!(planned.len(), 6);
        for p in &planned {
            let d = center.planar_distance(p.location);
            assert!(d >= rules.margin_radius(), "inside margin: {d}");
            assert!(d < rules.spawn_radius(), "outside spawn radius: {d}");
            assert!(rules.kinds().contains(&p.kind));
        }
    }

    #[test]
    fn existing_pokemon_reduce_the_batch() {
        let rules = rules();
        let center = GeoPoint::new(0.0, 0.0);
        let existing = vec![at(1.0, 1.0), at(0.0, 5.0), at(0.0, 20.0)];
        let mut rng = StdRng::seed_from_u64(2);

        // Two inside the spawn radius, one far away.
        let planned = plan_spawns(&existing, center, &rules, &mut rng, Utc::now());
        assert_eq!(planned.len(), 4);
    }

    #[test]
    fn spawn_radius_boundary_is_excluded() {
        let rules = rules();
        let center = GeoPoint::new(0.0, 0.0);
        let on_edge = vec![at(10.0, 0.0)];
        assert_eq!(count_within(&on_edge, center, rules.spawn_radius()), 0);
    }

    #[test]
    fn dense_area_plans_nothing() {
        let rules = rules();
        let center = GeoPoint::new(0.0, 0.0);
        let existing: Vec<Pokemon> = (0..8).map(|i| at(f64::from(i) * 0.5, 0.0)).collect();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(plan_spawns(&existing, center, &rules, &mut rng, Utc::now()).is_empty());
    }

    #[test]
    fn non_finite_locations_do_not_count() {
        let center = GeoPoint::new(0.0, 0.0);
        let existing = vec![at(f64::NAN, 0.0), at(0.0, f64::INFINITY)];
        assert_eq!(count_within(&existing, center, 10.0), 0);
    }

    #[tokio::test]
    async fn persist_writes_every_planned_pokemon() {
        let memory = MemoryStore::new();
        let store = Store::from(memory.clone());
        let planned = vec![at(0.0, 4.0), at(0.0, 5.0)];

        let stored = persist_spawns(&store, planned).await;
        assert_eq!(stored.len(), 2);
        assert_eq!(memory.pokemon_count().await, 2);
    }

    #[tokio::test]
    async fn persist_tolerates_store_failure() {
        let memory = MemoryStore::new();
        memory.set_unavailable(true).await;
        let store = Store::from(memory.clone());

        let stored = persist_spawns(&store, vec![at(0.0, 4.0)]).await;
        assert!(stored.is_empty());
    }
}
