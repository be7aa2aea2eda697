//! Storage layer for the Pokespawn game backend.
//!
//! Two logical tables are kept: world pokemon (get, scan, put, delete) and
//! users (get, put, atomic append to the captured collection). Three
//! interchangeable backends implement them:
//!
//! ```text
//! Store (enum dispatch)
//!     |-- MemoryStore     (tests, local dev)
//!     |-- DragonflyPool   (hash + set + lists)
//!     +-- PostgresPool    (pokemon / users tables)
//!         |-- PokemonStore
//!         +-- UserStore
//! ```
//!
//! # Modules
//!
//! - [`store`] -- [`Store`] dispatch and [`StoreConfig`]
//! - [`memory`] -- In-process backend
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) backend
//! - [`postgres`] -- `PostgreSQL` connection pool
//! - [`pokemon_store`] / [`user_store`] -- `PostgreSQL` table operations
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;
pub mod memory;
pub mod pokemon_store;
pub mod postgres;
pub mod store;
pub mod user_store;

// Re-export primary types for convenience.
pub use dragonfly::DragonflyPool;
pub use error::DbError;
pub use memory::MemoryStore;
pub use pokemon_store::{PokemonRow, PokemonStore};
pub use postgres::{PostgresConfig, PostgresPool};
pub use store::{BackendKind, Store, StoreConfig};
pub use user_store::UserStore;
