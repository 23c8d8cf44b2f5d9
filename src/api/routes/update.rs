use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::Player;
use crate::storage::Store;

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub message: String,
    pub player: Option<Player>,
    /// Display name of the refreshed player
    pub updated: String,
    pub team_stats_updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_error: Option<String>,
}

/// Run one update tick.
pub async fn run_update(State(state): State<AppState>) -> Result<Json<UpdateResponse>, ApiError> {
    let report = state.cycle.tick().await?;
    let player = state.store.get_player(&report.handle).await?;

    Ok(Json(UpdateResponse {
        message: "Player updated successfully".to_string(),
        player,
        updated: report.display_name,
        team_stats_updated: report.team_stats_updated,
        team_error: report.team_error,
    }))
}
