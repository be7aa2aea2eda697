//! Shared type definitions for the Pokespawn game backend.
//!
//! This crate is the single source of truth for the records exchanged
//! between the storage layer, the spawn/resolve engine, and the HTTP API.
//! Types flow downstream to `TypeScript` via `ts-rs` for game clients.
//!
//! # Modules
//!
//! - [`ids`] -- Pokemon and user identifiers
//! - [`enums`] -- [`PokemonKind`]
//! - [`structs`] -- Map points, world pokemon, users, nearby results

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::PokemonKind;
pub use ids::{IdError, MAX_USER_ID_LEN, PokemonId, UserId};
pub use structs::{CapturedPokemon, GeoPoint, NearbyPokemon, Pokemon, User};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings to `bindings/` relative to the crate
        // root when `export_all` is called.
        use ts_rs::TS;

        let _ = crate::ids::PokemonId::export_all();
        let _ = crate::ids::UserId::export_all();
        let _ = crate::enums::PokemonKind::export_all();
        let _ = crate::structs::GeoPoint::export_all();
        let _ = crate::structs::Pokemon::export_all();
        let _ = crate::structs::CapturedPokemon::export_all();
        let _ = crate::structs::User::export_all();
        let _ = crate::structs::NearbyPokemon::export_all();
    }
}
