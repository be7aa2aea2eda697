//! Spawn, resolve and capture logic for the Pokespawn game backend.
//!
//! Every nearby query runs the same pipeline: keep the area around the
//! player populated, pick the single nearest pokemon, and prune redundant
//! near-duplicates. Captures move a pokemon from the world into a user's
//! append-only collection.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `pokespawn-config.yaml` into
//!   strongly-typed structs, and validation into [`SpawnRules`].
//! - [`engine`] -- [`Engine`], the shared entry point for request handlers.
//! - [`spawn`] -- Density maintenance.
//! - [`resolve`] -- Nearest selection and pruning.
//! - [`capture`] -- Capture and get-or-create for users.
//! - [`geometry`] -- Planar distance helpers and annulus sampling.
//! - [`error`] -- [`CoreError`].
//!
//! [`SpawnRules`]: config::SpawnRules
//! [`Engine`]: engine::Engine
//! [`CoreError`]: error::CoreError

pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod resolve;
pub mod spawn;

pub use config::{ConfigError, GameConfig, ServiceConfig, SpawnRules};
pub use engine::Engine;
pub use error::CoreError;
