//! Operations on the `pokemon` table.
//!
//! Rows are inserted when the engine spawns a pokemon and deleted on
//! capture or duplicate pruning. There is no update path.

use chrono::{DateTime, Utc};
use pokespawn_types::{GeoPoint, Pokemon, PokemonId, PokemonKind};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `pokemon` table.
pub struct PokemonStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PokemonStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a pokemon by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails or
    /// [`DbError::Corrupt`] if the stored kind is unknown.
    pub async fn get(&self, id: PokemonId) -> Result<Option<Pokemon>, DbError> {
        let row = sqlx::query_as::<_, PokemonRow>(
            r"SELECT id, kind, latitude, longitude, spawned_at
              FROM pokemon
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(Pokemon::try_from).transpose()
    }

    /// Read every row of the table.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row is corrupt.
    pub async fn scan(&self) -> Result<Vec<Pokemon>, DbError> {
        let rows = sqlx::query_as::<_, PokemonRow>(
            r"SELECT id, kind, latitude, longitude, spawned_at
              FROM pokemon
              ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Pokemon::try_from).collect()
    }

    /// Insert a pokemon, replacing any row with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn put(&self, pokemon: &Pokemon) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO pokemon (id, kind, latitude, longitude, spawned_at)
              VALUES ($1, $2, $3, $4, $5)
              ON CONFLICT (id) DO UPDATE
              SET kind = EXCLUDED.kind,
                  latitude = EXCLUDED.latitude,
                  longitude = EXCLUDED.longitude,
                  spawned_at = EXCLUDED.spawned_at",
        )
        .bind(pokemon.id.into_inner())
        .bind(pokemon.kind.as_str())
        .bind(pokemon.location.latitude)
        .bind(pokemon.location.longitude)
        .bind(pokemon.spawned_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete a pokemon. Returns whether a row was removed; a missing row
    /// is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete(&self, id: PokemonId) -> Result<bool, DbError> {
        let result = sqlx::query(r"DELETE FROM pokemon WHERE id = $1")
            .bind(id.into_inner())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// A row from the `pokemon` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PokemonRow {
    /// Pokemon UUID.
    pub id: Uuid,
    /// Lowercase kind name.
    pub kind: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Spawn timestamp.
    pub spawned_at: DateTime<Utc>,
}

impl TryFrom<PokemonRow> for Pokemon {
    type Error = DbError;

    fn try_from(row: PokemonRow) -> Result<Self, Self::Error> {
        let kind: PokemonKind = row.kind.parse().map_err(DbError::Corrupt)?;
        Ok(Self {
            id: PokemonId(row.id),
            kind,
            location: GeoPoint::new(row.latitude, row.longitude),
            spawned_at: row.spawned_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_with_unknown_kind_is_corrupt() {
        let row = PokemonRow {
            id: Uuid::now_v7(),
            kind: String::from("missingno"),
            latitude: 0.0,
            longitude: 0.0,
            spawned_at: Utc::now(),
        };
        assert!(matches!(Pokemon::try_from(row), Err(DbError::Corrupt(_))));
    }

    #[test]
    fn row_converts_to_pokemon() {
        let id = Uuid::now_v7();
        let row = PokemonRow {
            id,
            kind: String::from("lickitung"),
            latitude: 12.5,
            longitude: -3.0,
            spawned_at: Utc::now(),
        };
        let pokemon = Pokemon::try_from(row).ok();
        assert_eq!(pokemon.as_ref().map(|p| p.id), Some(PokemonId(id)));
        assert_eq!(pokemon.map(|p| p.kind), Some(PokemonKind::Lickitung));
    }
}
