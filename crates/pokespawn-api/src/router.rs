//! Axum router construction.
//!
//! Assembles the game routes into a single [`Router`] with CORS, request
//! tracing and a per-request timeout.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the router with the default request timeout.
pub fn build_router(state: Arc<AppState>) -> Router {
    build_router_with_timeout(state, DEFAULT_REQUEST_TIMEOUT)
}

/// Build the complete router.
///
/// The router includes:
/// - `GET /` -- health and status
/// - `GET /pokemon/nearby?latitude=&longitude=[&format=text]`
/// - `DELETE /pokemon/{id}`
/// - `GET /users/{user_id}`
/// - `POST /users/{user_id}/pokemon/{pokemon_id}`
///
/// Requests running past `timeout` are answered with `408 Request
/// Timeout`. CORS allows any origin, since game clients call the API
/// directly from browsers and devices.
pub fn build_router_with_timeout(state: Arc<AppState>, timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/pokemon/nearby", get(handlers::nearby))
        .route("/pokemon/{id}", delete(handlers::delete_pokemon))
        .route("/users/{user_id}", get(handlers::get_user))
        .route(
            "/users/{user_id}/pokemon/{pokemon_id}",
            post(handlers::capture),
        )
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
