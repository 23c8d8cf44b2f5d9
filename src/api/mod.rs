//! REST API endpoints.
//!
//! Axum-based HTTP API for triggering update ticks, managing the roster,
//! and reading map and leaderboard projections.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::seed::SeedError;
use crate::storage::StorageError;
use crate::update::UpdateError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("API failed for {player}: {message}")]
    Provider { player: String, message: String },
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    /// Player the failing operation was working on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Provider { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "PROVIDER_ERROR"),
        };

        let player = match &self {
            ApiError::Provider { player, .. } => Some(player.clone()),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                player,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<SeedError> for ApiError {
    fn from(e: SeedError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<UpdateError> for ApiError {
    fn from(e: UpdateError) -> Self {
        match e {
            UpdateError::NoPlayers => ApiError::NotFound("No players found".to_string()),
            UpdateError::InvalidHandle { .. } => ApiError::BadRequest(e.to_string()),
            UpdateError::Provider { player, source } => ApiError::Provider {
                player,
                message: source.to_string(),
            },
            UpdateError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// CORS policy for a configured origin. `*` allows any origin.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origin.trim() == "*" {
        return layer.allow_origin(Any);
    }

    match HeaderValue::from_str(origin.trim()) {
        Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
        Err(_) => {
            warn!("Invalid CORS origin {:?}, allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/update", post(routes::update::run_update))
        .route(
            "/players",
            get(routes::players::list_players).post(routes::players::upsert_player),
        )
        .route("/players/seed", post(routes::players::seed_roster))
        .route("/maps/team", get(routes::maps::team_maps))
        .route("/maps/players", get(routes::maps::player_maps))
        .route("/leaderboard", get(routes::leaderboard::leaderboard))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
