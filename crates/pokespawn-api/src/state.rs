//! Shared application state for the HTTP handlers.

use pokespawn_core::Engine;

/// State shared by every request handler.
///
/// Wrapped in an `Arc` by the router; the engine itself is safe to share.
#[derive(Debug)]
pub struct AppState {
    /// The game engine.
    pub engine: Engine,
}

impl AppState {
    /// Wrap an engine for serving.
    pub const fn new(engine: Engine) -> Self {
        Self { engine }
    }
}
