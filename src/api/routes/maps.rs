use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{PlayerMapStat, TeamAggregate};
use crate::storage::Store;

/// The current team aggregate.
pub async fn team_maps(State(state): State<AppState>) -> Result<Json<TeamAggregate>, ApiError> {
    state.store.team_aggregate().await?.map(Json).ok_or_else(|| {
        ApiError::NotFound(
            "No team map data available yet; it is computed during update ticks".to_string(),
        )
    })
}

#[derive(Debug, Serialize)]
pub struct PlayerIdentity {
    pub handle: String,
    pub display_name: String,
    pub avatar: String,
}

#[derive(Debug, Serialize)]
pub struct PlayerMapsEntry {
    pub player: PlayerIdentity,
    pub best_map: Option<String>,
    pub best_map_win_rate: f64,
    pub map_stats: BTreeMap<String, PlayerMapStat>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Map projection of every player.
pub async fn player_maps(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerMapsEntry>>, ApiError> {
    let players = state.store.list_players().await?;
    if players.is_empty() {
        return Err(ApiError::NotFound("No players found".to_string()));
    }

    let entries = players
        .into_iter()
        .map(|p| PlayerMapsEntry {
            player: PlayerIdentity {
                handle: p.handle,
                display_name: p.display_name,
                avatar: p.avatar,
            },
            best_map: p.best_map,
            best_map_win_rate: p.best_map_win_rate,
            map_stats: p.map_stats,
            last_updated: p.last_updated,
        })
        .collect();

    Ok(Json(entries))
}
