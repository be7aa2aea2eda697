//! Operations on the `users` table.
//!
//! The collection column is a JSONB array. Appends use jsonb concatenation
//! inside a single upsert statement, so they are atomic per user and
//! create the row on first capture.

use pokespawn_types::{CapturedPokemon, User, UserId};
use sqlx::PgPool;

use crate::error::DbError;

/// Operations on the `users` table.
pub struct UserStore<'a> {
    pool: &'a PgPool,
}

impl<'a> UserStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails or
    /// [`DbError::Serialization`] if the collection cannot be decoded.
    pub async fn get(&self, id: &UserId) -> Result<Option<User>, DbError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as(r"SELECT collection FROM users WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(self.pool)
                .await?;

        row.map(|(collection,)| -> Result<User, DbError> {
            Ok(User {
                id: id.clone(),
                collection: serde_json::from_value(collection)?,
            })
        })
        .transpose()
    }

    /// Insert or replace a user record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or the upsert fails.
    pub async fn put(&self, user: &User) -> Result<(), DbError> {
        let collection = serde_json::to_value(&user.collection)?;
        sqlx::query(
            r"INSERT INTO users (id, collection)
              VALUES ($1, $2)
              ON CONFLICT (id) DO UPDATE SET collection = EXCLUDED.collection",
        )
        .bind(user.id.as_str())
        .bind(collection)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Create a user with an empty collection unless the row exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert_if_absent(&self, id: &UserId) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO users (id, collection)
              VALUES ($1, '[]'::jsonb)
              ON CONFLICT (id) DO NOTHING",
        )
        .bind(id.as_str())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Append captured pokemon to a user's collection, creating the user if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or the upsert fails.
    pub async fn append_captured(
        &self,
        id: &UserId,
        items: &[CapturedPokemon],
    ) -> Result<(), DbError> {
        let items = serde_json::to_value(items)?;
        sqlx::query(
            r"INSERT INTO users (id, collection)
              VALUES ($1, $2)
              ON CONFLICT (id) DO UPDATE
              SET collection = users.collection || EXCLUDED.collection",
        )
        .bind(id.as_str())
        .bind(items)
        .execute(self.pool)
        .await?;

        tracing::debug!(user_id = %id, "Appended to user collection");
        Ok(())
    }
}
