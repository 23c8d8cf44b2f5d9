use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::ranking::{rank_players, RankingKey};
use crate::models::Player;
use crate::storage::Store;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub by: RankingKey,
    pub players: Vec<Player>,
}

/// One board, ordered by `?by=mmr|kd|composite` (default `mmr`).
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let key = match params.by.as_deref() {
        Some(raw) => raw.parse::<RankingKey>().map_err(ApiError::BadRequest)?,
        None => RankingKey::default(),
    };

    let players = state.store.list_players().await?;

    Ok(Json(LeaderboardResponse {
        by: key,
        players: rank_players(players, key),
    }))
}
