//! HTTP API for the Pokespawn game backend.
//!
//! A thin Axum layer over [`pokespawn_core::Engine`]: handlers parse the
//! request, call one engine operation, and serialize the result. Errors
//! are mapped to status codes with a generic body.
//!
//! # Modules
//!
//! - [`router`] -- Route table and middleware.
//! - [`handlers`] -- Endpoint handlers.
//! - [`server`] -- [`start_server`](server::start_server) and shutdown.
//! - [`state`] -- [`AppState`](state::AppState).
//! - [`error`] -- [`ApiError`](error::ApiError).

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
