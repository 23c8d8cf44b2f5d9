//! Update cycle.
//!
//! One tick refreshes exactly one player, the one with the oldest
//! `last_updated`:
//! 1. Select the stalest player
//! 2. Parse its handle (failure leaves the record untouched)
//! 3. Fetch rating, season summary and map stats from the provider
//!    (failure still advances `last_updated` so the roster keeps rotating)
//! 4. Persist everything in one document write
//! 5. Recompute the team aggregate every `team_every` positions, or when
//!    none exists yet; errors here are logged and never fail the tick

mod schedule;

pub use schedule::*;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::models::{
    Handle, HandleError, MapStatsSummary, Player, Rating, SeasonSummary, TeamAggregate,
};
use crate::provider::{
    fetch_map_stats, fetch_season_summary, fetch_team_map_stats, AggregationSettings,
    ProviderError, StatsProvider,
};
use crate::storage::{StorageError, Store};

/// Source of "now" for a cycle.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Errors that end a tick.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("No players found")]
    NoPlayers,

    #[error("Invalid handle for {player}: {source}")]
    InvalidHandle {
        player: String,
        #[source]
        source: HandleError,
    },

    #[error("API failed for {player}: {source}")]
    Provider {
        player: String,
        #[source]
        source: ProviderError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl UpdateError {
    /// Display name of the player the tick was working on, if any.
    pub fn player(&self) -> Option<&str> {
        match self {
            UpdateError::InvalidHandle { player, .. } | UpdateError::Provider { player, .. } => {
                Some(player)
            }
            _ => None,
        }
    }
}

/// Tunables for the cycle.
#[derive(Debug, Clone)]
pub struct UpdateSettings {
    pub aggregation: AggregationSettings,
    pub team_every: usize,
    pub cycle_timeout: Duration,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            aggregation: AggregationSettings::default(),
            team_every: 10,
            cycle_timeout: Duration::from_secs(60),
        }
    }
}

/// Outcome of a successful tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub handle: String,
    pub display_name: String,
    /// False when the provider had no matches and season counters were kept
    pub season_updated: bool,
    /// Players updated strictly before this one
    pub recency_index: usize,
    pub team_stats_updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_error: Option<String>,
}

/// Whether a tick at `recency_index` should rebuild the team aggregate.
pub fn should_recompute_team(recency_index: usize, every: usize, aggregate_exists: bool) -> bool {
    !aggregate_exists || recency_index % every.max(1) == 0
}

/// Orchestrates ticks against a store and a provider.
pub struct UpdateCycle {
    store: Arc<dyn Store>,
    provider: Arc<dyn StatsProvider>,
    settings: UpdateSettings,
    clock: Clock,
    lock: Mutex<()>,
}

type Fetched = (Rating, Option<SeasonSummary>, MapStatsSummary);

impl UpdateCycle {
    pub fn new(
        store: Arc<dyn Store>,
        provider: Arc<dyn StatsProvider>,
        settings: UpdateSettings,
    ) -> Self {
        info!("Update cycle using the {} stats provider", provider.name());

        Self {
            store,
            provider,
            settings,
            clock: Arc::new(Utc::now),
            lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Run one full cycle. Concurrent callers are serialized.
    pub async fn tick(&self) -> Result<TickReport, UpdateError> {
        let _guard = self.lock.lock().await;

        let player = self
            .store
            .find_stalest()
            .await?
            .ok_or(UpdateError::NoPlayers)?;

        let handle = player.parse_handle().map_err(|source| {
            error!("Invalid handle format: {}", player.handle);
            UpdateError::InvalidHandle {
                player: player.display_name.clone(),
                source,
            }
        })?;

        info!("Updating {} ({})", player.display_name, handle);

        let fetched = match tokio::time::timeout(
            self.settings.cycle_timeout,
            self.fetch_player(&handle, self.now()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.settings.cycle_timeout.as_secs())),
        };

        let (rating, season, maps) = match fetched {
            Ok(fetched) => fetched,
            Err(source) => {
                error!("API error for {}: {}", player.display_name, source);
                // Advance anyway so a broken record does not pin the rotation
                if let Err(e) = self.store.touch_player(&player.handle, self.now()).await {
                    error!("Failed to advance {} after API error: {}", player.handle, e);
                }
                return Err(UpdateError::Provider {
                    player: player.display_name,
                    source,
                });
            }
        };

        let season_updated = season.is_some();
        let updated_at = self.now();
        // Profile fields may have been edited while the provider was busy,
        // so the refresh lands on the stored document rather than our copy
        let updated = self
            .store
            .refresh_player(&player.handle, rating, season, maps, updated_at)
            .await?;

        info!(
            "Updated {}: {} ({}), kd {}",
            updated.display_name, updated.rank, updated.mmr, updated.kd
        );

        let (recency_index, team_stats_updated, team_error) =
            match self.maybe_recompute_team(updated_at).await {
                Ok((index, recomputed)) => (index, recomputed, None),
                Err(e) => {
                    warn!("Error updating team map stats: {}", e);
                    (0, false, Some(e.to_string()))
                }
            };

        Ok(TickReport {
            handle: updated.handle,
            display_name: updated.display_name,
            season_updated,
            recency_index,
            team_stats_updated,
            team_error,
        })
    }

    async fn fetch_player(
        &self,
        handle: &Handle,
        now: DateTime<Utc>,
    ) -> Result<Fetched, ProviderError> {
        let provider = self.provider.as_ref();
        let settings = &self.settings.aggregation;

        let rating = provider.fetch_rating(handle).await?;

        let season = match fetch_season_summary(provider, handle, settings).await {
            Ok(season) => Some(season),
            Err(ProviderError::NoMatches(_)) => {
                info!("No matches for {}, keeping season stats", handle);
                None
            }
            Err(e) => return Err(e),
        };

        let maps = fetch_map_stats(provider, handle, settings, now).await?;

        Ok((rating, season, maps))
    }

    /// Returns the recency index and whether the aggregate was rebuilt.
    async fn maybe_recompute_team(
        &self,
        updated_at: DateTime<Utc>,
    ) -> Result<(usize, bool), StorageError> {
        let recency_index = self.store.count_updated_before(updated_at).await?;
        let exists = self.store.team_aggregate().await?.is_some();

        if !should_recompute_team(recency_index, self.settings.team_every, exists) {
            return Ok((recency_index, false));
        }

        info!(
            "Recomputing team map stats (recency index {}, existing: {})",
            recency_index, exists
        );
        self.recompute_team().await?;
        Ok((recency_index, true))
    }

    /// Rebuild the team aggregate from every player's map stats.
    pub async fn recompute_team(&self) -> Result<TeamAggregate, StorageError> {
        let players: Vec<Player> = self.store.list_players().await?;
        let now = self.now();
        let summary = fetch_team_map_stats(
            self.provider.as_ref(),
            &players,
            &self.settings.aggregation,
            now,
        )
        .await;

        let aggregate = TeamAggregate::from_summary(summary, now);
        self.store.save_team_aggregate(&aggregate).await?;
        info!(
            "Team map stats saved: best {:?} at {:.1}%",
            aggregate.best_team_map, aggregate.best_team_win_rate
        );
        Ok(aggregate)
    }
}
