//! REST endpoint handlers.
//!
//! Handlers only parse the request and shape the response; all game
//! logic lives in [`Engine`](pokespawn_core::Engine).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Health and status |
//! | `GET` | `/pokemon/nearby` | Nearest pokemon to a point |
//! | `DELETE` | `/pokemon/{id}` | Remove a pokemon from the world |
//! | `GET` | `/users/{user_id}` | Get or create a user |
//! | `POST` | `/users/{user_id}/pokemon/{pokemon_id}` | Capture a pokemon |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use pokespawn_types::{PokemonId, UserId};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /pokemon/nearby`.
///
/// Coordinates arrive as raw strings so malformed values produce the
/// standard error body instead of an extractor rejection.
#[derive(Debug, Default, serde::Deserialize)]
pub struct NearbyQuery {
    /// Latitude in decimal degrees.
    pub latitude: Option<String>,
    /// Longitude in decimal degrees.
    pub longitude: Option<String>,
    /// `text` selects the line-oriented format; anything else is JSON.
    pub format: Option<String>,
}

fn parse_coordinate(name: &str, raw: Option<&str>) -> Result<f64, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::BadRequest(format!("missing {name}")))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid {name} {raw:?}: {e}")))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(format!("{name} must be finite")))
    }
}

fn parse_pokemon_id(raw: &str) -> Result<PokemonId, ApiError> {
    raw.parse()
        .map_err(|e: pokespawn_types::IdError| ApiError::BadRequest(e.to_string()))
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse()
        .map_err(|e: pokespawn_types::IdError| ApiError::BadRequest(e.to_string()))
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Liveness check with the active backend name.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "pokespawn",
        "status": "ok",
        "store": state.engine.store().name(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// GET /pokemon/nearby
// ---------------------------------------------------------------------------

/// Populate the area around the caller and return the nearest pokemon.
///
/// JSON responses carry the `NearbyPokemon` object, or `null` when the
/// world is empty. With `format=text` the body is five lines
/// (activation flag, id, kind, latitude, longitude), or empty.
pub async fn nearby(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> Result<Response, ApiError> {
    let latitude = parse_coordinate("latitude", query.latitude.as_deref())?;
    let longitude = parse_coordinate("longitude", query.longitude.as_deref())?;

    let nearest = state.engine.resolve_nearby(latitude, longitude).await?;

    let as_text = query
        .format
        .as_deref()
        .is_some_and(|f| f.eq_ignore_ascii_case("text"));
    if as_text {
        let body = nearest.map(|n| n.to_text()).unwrap_or_default();
        return Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response());
    }

    Ok(Json(nearest).into_response())
}

// ---------------------------------------------------------------------------
// DELETE /pokemon/{id}
// ---------------------------------------------------------------------------

/// Remove a pokemon from the world. Deleting an unknown id succeeds.
pub async fn delete_pokemon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let pokemon_id = parse_pokemon_id(&id)?;
    state.engine.delete_pokemon(pokemon_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /users/{user_id}
// ---------------------------------------------------------------------------

/// Return the user, creating an empty one on first access.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let user = state.engine.get_or_create_user(&user_id).await?;
    Ok(Json(user))
}

// ---------------------------------------------------------------------------
// POST /users/{user_id}/pokemon/{pokemon_id}
// ---------------------------------------------------------------------------

/// Capture a pokemon into the user's collection and return the user.
pub async fn capture(
    State(state): State<Arc<AppState>>,
    Path((user_id, pokemon_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let pokemon_id = parse_pokemon_id(&pokemon_id)?;
    let user = state.engine.capture(&user_id, pokemon_id).await?;
    Ok(Json(user))
}
