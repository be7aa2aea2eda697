//! Core record types: world pokemon, users, and query results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::PokemonKind;
use crate::ids::{PokemonId, UserId};

/// A point on the map, in decimal degrees.
///
/// Distances between points are computed on the plane (flat-earth
/// approximation), which is only meaningful over short ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both coordinates are finite numbers.
    pub const fn is_finite(self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Planar Euclidean distance to `other`, in degrees.
    pub fn planar_distance(self, other: Self) -> f64 {
        (self.latitude - other.latitude).hypot(self.longitude - other.longitude)
    }

    /// The point displaced by `(d_lat, d_lon)` degrees.
    #[must_use]
    pub fn offset(self, d_lat: f64, d_lon: f64) -> Self {
        Self::new(self.latitude + d_lat, self.longitude + d_lon)
    }
}

/// A pokemon currently spawned in the world.
///
/// Immutable once created: it is either captured into a user's
/// collection or pruned, never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Pokemon {
    /// Unique identifier.
    pub id: PokemonId,
    /// Species.
    #[serde(rename = "type")]
    pub kind: PokemonKind,
    /// Where the pokemon stands.
    pub location: GeoPoint,
    /// When the pokemon was spawned.
    pub spawned_at: DateTime<Utc>,
}

/// Summary of a captured pokemon stored in a user's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CapturedPokemon {
    /// The identifier the pokemon had in the world.
    pub id: PokemonId,
    /// Species.
    #[serde(rename = "type")]
    pub kind: PokemonKind,
    /// When the capture happened.
    pub captured_at: DateTime<Utc>,
}

impl CapturedPokemon {
    /// Summarize a world pokemon captured at `captured_at`.
    pub const fn from_pokemon(pokemon: &Pokemon, captured_at: DateTime<Utc>) -> Self {
        Self {
            id: pokemon.id,
            kind: pokemon.kind,
            captured_at,
        }
    }
}

/// A player and their append-only collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct User {
    /// Client-supplied identifier.
    pub id: UserId,
    /// Captured pokemon, oldest first.
    #[serde(rename = "pokemonCollection")]
    pub collection: Vec<CapturedPokemon>,
}

impl User {
    /// A user with an empty collection.
    pub const fn new(id: UserId) -> Self {
        Self {
            id,
            collection: Vec::new(),
        }
    }

    /// Whether the collection holds a pokemon with the given id.
    pub fn has_captured(&self, id: PokemonId) -> bool {
        self.collection.iter().any(|c| c.id == id)
    }
}

/// Result of a nearby query: the single nearest pokemon to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NearbyPokemon {
    /// True iff the pokemon is strictly inside the activation radius.
    pub should_activate: bool,
    /// The nearest pokemon.
    pub pokemon: Pokemon,
    /// Planar distance from the query point, in degrees.
    pub distance: f64,
}

impl NearbyPokemon {
    /// Render in the newline-separated format read by low-power clients:
    /// activation flag, id, kind, latitude, longitude.
    pub fn to_text(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n",
            self.should_activate,
            self.pokemon.id,
            self.pokemon.kind,
            self.pokemon.location.latitude,
            self.pokemon.location.longitude,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_pokemon() -> Pokemon {
        Pokemon {
            id: PokemonId::new(),
            kind: PokemonKind::Piplup,
            location: GeoPoint::new(1.5, -2.25),
            spawned_at: Utc::now(),
        }
    }

    #[test]
    fn planar_distance_is_euclidean() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(3.0, 4.0);
        assert!((a.planar_distance(b) - 5.0).abs() < 1e-12);
        assert!((b.planar_distance(a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_points_are_detected() {
        assert!(GeoPoint::new(1.0, 2.0).is_finite());
        assert!(!GeoPoint::new(f64::NAN, 2.0).is_finite());
        assert!(!GeoPoint::new(1.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn pokemon_json_uses_type_field() {
        let pokemon = sample_pokemon();
        let value = serde_json::to_value(&pokemon).unwrap_or_default();
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("piplup"));
        assert!(value.get("spawnedAt").is_some());
    }

    #[test]
    fn user_json_uses_pokemon_collection_field() {
        let user = User::new("brock".parse().unwrap());
        let value = serde_json::to_value(&user).unwrap_or_default();
        assert_eq!(
            value.get("pokemonCollection").and_then(|v| v.as_array()).map(Vec::len),
            Some(0)
        );
    }

    #[test]
    fn text_format_has_five_lines() {
        let pokemon = sample_pokemon();
        let nearby = NearbyPokemon {
            should_activate: true,
            pokemon: pokemon.clone(),
            distance: 0.0,
        };
        let text = nearby.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "true",
                pokemon.id.to_string().as_str(),
                "piplup",
                "1.5",
                "-2.25"
            ]
        );
    }
}
