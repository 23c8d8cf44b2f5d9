use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::ranking::{rank_players, RankingKey};
use crate::models::{Player, PlayerPatch};
use crate::seed::{load_manifest, seed_if_empty, seed_players};
use crate::storage::Store;

/// All players, highest rating first. Seeds the roster from the manifest
/// when it is empty.
pub async fn list_players(State(state): State<AppState>) -> Result<Json<Vec<Player>>, ApiError> {
    seed_if_empty(state.store.as_ref(), &state.manifest_path, state.cycle.now()).await;

    let players = state.store.list_players().await?;
    Ok(Json(rank_players(players, RankingKey::Mmr)))
}

/// Create or update one player by handle, merging only the fields present
/// in the body.
pub async fn upsert_player(
    State(state): State<AppState>,
    Json(patch): Json<PlayerPatch>,
) -> Result<Json<Player>, ApiError> {
    let handle = patch.handle.trim().to_string();
    if handle.is_empty() {
        return Err(ApiError::BadRequest("handle is required".to_string()));
    }

    let now = state.cycle.now();
    let player = match state.store.get_player(&handle).await? {
        Some(mut existing) => {
            existing.apply_patch(patch, now);
            existing
        }
        None => {
            let (Some(display_name), Some(avatar)) =
                (patch.display_name.clone(), patch.avatar.clone())
            else {
                return Err(ApiError::BadRequest(
                    "display_name and avatar are required for a new player".to_string(),
                ));
            };
            info!("Adding player {} ({})", display_name, handle);
            let mut player = Player::new(handle, display_name, avatar, now);
            player.apply_patch(patch, now);
            player
        }
    };

    state.store.save_player(&player).await?;
    Ok(Json(player))
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub count: usize,
    pub inserted: usize,
    pub updated: usize,
}

/// Upsert the whole manifest. Safe to repeat.
pub async fn seed_roster(State(state): State<AppState>) -> Result<Json<SeedResponse>, ApiError> {
    let entries = load_manifest(&state.manifest_path)?;
    let report = seed_players(state.store.as_ref(), &entries, state.cycle.now()).await?;

    Ok(Json(SeedResponse {
        message: "Roster seeded successfully".to_string(),
        count: report.count,
        inserted: report.inserted,
        updated: report.updated,
    }))
}
