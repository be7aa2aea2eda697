//! Nearest-pokemon resolution and duplicate pruning.
//!
//! A single pass over the world picks the pokemon closest to the query
//! point. Whenever a nearer pokemon takes the "nearest so far" slot, the
//! one it displaced is queued for pruning if it was itself inside the
//! margin radius. Only pokemon inside the margin radius are ever pruned,
//! and the final nearest never is.

use futures::future::join_all;
use pokespawn_db::Store;
use pokespawn_types::{GeoPoint, NearbyPokemon, Pokemon, PokemonId};

use crate::config::SpawnRules;

/// Outcome of a resolution pass, before any deletes are issued.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The nearest pokemon, if the world is non-empty.
    pub nearest: Option<NearbyPokemon>,
    /// Pokemon to delete, in the order they were superseded.
    pub to_prune: Vec<PokemonId>,
}

/// Pick the nearest pokemon to `center` and collect prune candidates.
///
/// Ties keep the first pokemon seen. Pokemon with a non-finite distance
/// are ignored. `should_activate` is `distance < activate_radius`.
pub fn select_nearest(world: &[Pokemon], center: GeoPoint, rules: &SpawnRules) -> Resolution {
    let mut best: Option<(&Pokemon, f64)> = None;
    let mut to_prune: Vec<PokemonId> = Vec::new();

    for pokemon in world {
        let distance = center.planar_distance(pokemon.location);
        if !distance.is_finite() {
            continue;
        }

        let promote = best.is_none_or(|(_, best_distance)| distance < best_distance);
        if promote {
            let displaced =
                best.filter(|&(_, previous_distance)| previous_distance < rules.margin_radius());
            if let Some((previous, _)) = displaced {
                to_prune.push(previous.id);
            }
            best = Some((pokemon, distance));
        }

        if let Some((current, _)) = best {
            to_prune.retain(|id| *id != current.id);
        }
    }

    let nearest = best.map(|(pokemon, distance)| NearbyPokemon {
        should_activate: distance < rules.activate_radius(),
        pokemon: pokemon.clone(),
        distance,
    });

    Resolution { nearest, to_prune }
}

/// Delete the given pokemon concurrently.
///
/// Each delete is independent. Failures are logged and otherwise ignored.
/// Returns the ids that were deleted.
pub async fn prune(store: &Store, ids: &[PokemonId]) -> Vec<PokemonId> {
    if ids.is_empty() {
        return Vec::new();
    }

    let results = join_all(ids.iter().map(|&id| async move {
        let result = store.delete_pokemon(id).await;
        (id, result)
    }))
    .await;

    let mut pruned = Vec::with_capacity(ids.len());
    for (id, result) in results {
        match result {
            Ok(()) => {
                pruned.push(id);
                tracing::debug!(pokemon_id = %id, "Pruned duplicate pokemon");
            }
            Err(err) => {
                tracing::warn!(pokemon_id = %id, error = %err, "Failed to prune pokemon");
            }
        }
    }

    tracing::info!(
        candidates = ids.len(),
        pruned = pruned.len(),
        "Prune pass complete"
    );
    pruned
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use pokespawn_db::MemoryStore;
    use pokespawn_types::PokemonKind;
    use uuid::Uuid;

    use super::*;

    /// activate 1, margin 3, spawn 10 (degrees).
    fn rules() -> SpawnRules {
        SpawnRules::new(PokemonKind::ALL.to_vec(), 6, 1.0, 3.0, 10.0).unwrap()
    }

    fn at(n: u128, lon: f64) -> Pokemon {
        Pokemon {
            id: PokemonId(Uuid::from_u128(n)),
            kind: PokemonKind::Jigglypuff,
            location: GeoPoint::new(0.0, lon),
            spawned_at: Utc::now(),
        }
    }

    const ORIGIN: GeoPoint = GeoPoint::new(0.0, 0.0);

    #[test]
    fn empty_world_resolves_to_nothing() {
        let resolution = select_nearest(&[], ORIGIN, &rules());
        assert!(resolution.nearest.is_none());
        assert!(resolution.to_prune.is_empty());
    }

    #[test]
    fn single_pokemon_is_never_pruned() {
        let world = vec![at(1, 0.5)];
        let resolution = select_nearest(&world, ORIGIN, &rules());
        let nearest = resolution.nearest.unwrap();
        assert_eq!(nearest.pokemon.id, world[0].id);
        assert!(nearest.should_activate);
        assert!(resolution.to_prune.is_empty());
    }

    #[test]
    fn superseded_candidate_inside_margin_is_pruned() {
        // Seen in order: 2.0 (inside margin), then 0.5 (nearer).
        let world = vec![at(1, 2.0), at(2, 0.5)];
        let resolution = select_nearest(&world, ORIGIN, &rules());
        assert_eq!(resolution.nearest.map(|n| n.pokemon.id), Some(world[1].id));
        assert_eq!(resolution.to_prune, vec![world[0].id]);
    }

    #[test]
    fn nearer_seen_first_prunes_nothing() {
        // The farther one is never promoted, so it is never a candidate.
        let world = vec![at(1, 0.5), at(2, 2.0)];
        let resolution = select_nearest(&world, ORIGIN, &rules());
        assert_eq!(resolution.nearest.map(|n| n.pokemon.id), Some(world[0].id));
        assert!(resolution.to_prune.is_empty());
    }

    #[test]
    fn five_and_eight_metres_prunes_the_farther() {
        // activate 10, margin 30, spawn 100, with 8.0 seen before 5.0.
        let rules = SpawnRules::new(PokemonKind::ALL.to_vec(), 6, 10.0, 30.0, 100.0).unwrap();
        let world = vec![at(1, 8.0), at(2, 5.0)];
        let resolution = select_nearest(&world, ORIGIN, &rules);
        let nearest = resolution.nearest.unwrap();
        assert_eq!(nearest.pokemon.id, world[1].id);
        assert!(nearest.should_activate);
        assert_eq!(resolution.to_prune, vec![world[0].id]);
    }

    #[test]
    fn displaced_best_outside_margin_is_kept() {
        // 5.0 is displaced by 2.0, but 5.0 sits outside the margin.
        let world = vec![at(1, 5.0), at(2, 2.0)];
        let resolution = select_nearest(&world, ORIGIN, &rules());
        assert_eq!(resolution.nearest.map(|n| n.pokemon.id), Some(world[1].id));
        assert!(resolution.to_prune.is_empty());
    }

    #[test]
    fn pokemon_outside_margin_are_never_pruned() {
        let world = vec![at(1, 8.0), at(2, 5.0), at(3, 2.0)];
        let resolution = select_nearest(&world, ORIGIN, &rules());
        assert_eq!(resolution.nearest.map(|n| n.pokemon.id), Some(world[2].id));
        assert!(resolution.to_prune.is_empty());
    }

    #[test]
    fn chain_of_promotions_prunes_each_former_best() {
        let world = vec![at(1, 2.5), at(2, 9.0), at(3, 1.5), at(4, 0.2)];
        let resolution = select_nearest(&world, ORIGIN, &rules());
        assert_eq!(resolution.nearest.map(|n| n.pokemon.id), Some(world[3].id));
        assert_eq!(resolution.to_prune, vec![world[0].id, world[2].id]);
    }

    #[test]
    fn ties_keep_first_seen() {
        let world = vec![at(1, 2.0), at(2, 2.0)];
        let resolution = select_nearest(&world, ORIGIN, &rules());
        assert_eq!(resolution.nearest.map(|n| n.pokemon.id), Some(world[0].id));
        assert!(resolution.to_prune.is_empty());
    }

    #[test]
    fn activation_boundary_is_exclusive() {
        let world = vec![at(1, 1.0)];
        let nearest = select_nearest(&world, ORIGIN, &rules()).nearest.unwrap();
        assert!((nearest.distance - 1.0).abs() < f64::EPSILON);
        assert!(!nearest.should_activate);
    }

    #[test]
    fn non_finite_locations_are_skipped() {
        let mut broken = at(1, 0.1);
        broken.location.latitude = f64::NAN;
        let world = vec![broken, at(2, 4.0)];
        let resolution = select_nearest(&world, ORIGIN, &rules());
        assert_eq!(resolution.nearest.map(|n| n.pokemon.id), Some(world[1].id));
    }

    #[tokio::test]
    async fn prune_deletes_candidates() {
        let memory = MemoryStore::new();
        let store = Store::from(memory.clone());
        let a = at(1, 2.0);
        let b = at(2, 2.5);
        store.put_pokemon(&a).await.unwrap();
        store.put_pokemon(&b).await.unwrap();

        let pruned = prune(&store, &[a.id, b.id]).await;
        assert_eq!(pruned, vec![a.id, b.id]);
        assert_eq!(memory.pokemon_count().await, 0);
    }

    #[tokio::test]
    async fn prune_continues_past_failures() {
        let memory = MemoryStore::new();
        let store = Store::from(memory.clone());
        let a = at(1, 2.0);
        let b = at(2, 2.5);
        store.put_pokemon(&a).await.unwrap();
        store.put_pokemon(&b).await.unwrap();
        memory.fail_deletes_for(a.id).await;

        let pruned = prune(&store, &[a.id, b.id]).await;
        assert_eq!(pruned, vec![b.id]);
        assert!(store.get_pokemon(a.id).await.unwrap().is_some());
        assert!(store.get_pokemon(b.id).await.unwrap().is_none());
    }
}
