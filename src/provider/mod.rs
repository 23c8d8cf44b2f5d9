//! Stats provider client.
//!
//! The provider exposes two raw reads per account (current rating and
//! stored match history). Season, map and team aggregates are derived here
//! from those reads via the pure folds in [`crate::calculate`].

mod henrik;
#[cfg(test)]
pub mod mock;

pub use henrik::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculate::{summarize_maps, summarize_season, summarize_team};
use crate::models::{
    Handle, MapStatsSummary, Player, Rating, SeasonSummary, StoredMatch, TeamMapSummary,
};

/// Errors that can occur talking to the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("API key contains characters not allowed in a header")]
    InvalidApiKey,

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("No matches found for {0}")]
    NoMatches(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

/// Sample sizes and thresholds for the derived aggregates.
#[derive(Debug, Clone)]
pub struct AggregationSettings {
    /// Matches fetched for the season summary
    pub season_sample: usize,
    /// Matches fetched for map stats
    pub map_sample: usize,
    /// Lookback window for map stats
    pub map_window_days: i64,
    /// Minimum games on a map for a player's best map
    pub player_min_games: u32,
    /// Minimum games on a map for the team's best map
    pub team_min_games: u32,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            season_sample: 50,
            map_sample: 200,
            map_window_days: 30,
            player_min_games: 3,
            team_min_games: 10,
        }
    }
}

/// Raw reads against the third-party stats API.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Provider identifier for logging.
    fn name(&self) -> &'static str;

    /// Current competitive standing, with fallbacks already applied to
    /// missing fields.
    async fn fetch_rating(&self, handle: &Handle) -> Result<Rating, ProviderError>;

    /// Up to `size` most recent matches, newest first. An account without
    /// history yields an empty list.
    async fn fetch_matches(
        &self,
        handle: &Handle,
        size: usize,
    ) -> Result<Vec<StoredMatch>, ProviderError>;
}

/// Counters over the current season, where the current season is the one
/// of the newest fetched match.
pub async fn fetch_season_summary(
    provider: &dyn StatsProvider,
    handle: &Handle,
    settings: &AggregationSettings,
) -> Result<SeasonSummary, ProviderError> {
    let matches = provider.fetch_matches(handle, settings.season_sample).await?;
    summarize_season(&matches).ok_or_else(|| ProviderError::NoMatches(handle.to_string()))
}

/// Per-map stats over the lookback window. An empty history produces the
/// no-data summary rather than an error.
pub async fn fetch_map_stats(
    provider: &dyn StatsProvider,
    handle: &Handle,
    settings: &AggregationSettings,
    now: DateTime<Utc>,
) -> Result<MapStatsSummary, ProviderError> {
    let matches = provider.fetch_matches(handle, settings.map_sample).await?;
    let summary = summarize_maps(
        &matches,
        now,
        settings.map_window_days,
        settings.player_min_games,
    );
    debug!(
        "{}: {} maps over {} recent games, best {:?}",
        handle,
        summary.map_stats.len(),
        summary.total_games,
        summary.best_map
    );
    Ok(summary)
}

/// Map stats unioned across the roster. Players with malformed handles,
/// failed fetches or no recent games are skipped.
pub async fn fetch_team_map_stats(
    provider: &dyn StatsProvider,
    players: &[Player],
    settings: &AggregationSettings,
    now: DateTime<Utc>,
) -> TeamMapSummary {
    let mut per_player = Vec::with_capacity(players.len());

    for player in players {
        let handle = match player.parse_handle() {
            Ok(h) => h,
            Err(e) => {
                warn!("Skipping {} in team stats: {}", player.display_name, e);
                continue;
            }
        };

        match fetch_map_stats(provider, &handle, settings, now).await {
            Ok(summary) if summary.has_data() => per_player.push(summary),
            Ok(_) => debug!("No recent map data for {}", handle),
            Err(e) => warn!("Map stats failed for {} in team stats: {}", handle, e),
        }
    }

    summarize_team(&per_player, settings.team_min_games)
}

#[cfg(test)]
mod tests {
    use super::mock::MockProvider;
    use super::*;
    use crate::calculate::fixtures::make_match;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 20, 0, 0).unwrap()
    }

    fn handle(raw: &str) -> Handle {
        Handle::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_season_summary_no_matches() {
        let provider = MockProvider::new();
        let err = fetch_season_summary(&provider, &handle("sage#NA1"), &Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoMatches(_)));
    }

    #[tokio::test]
    async fn test_season_summary_requests_season_sample() {
        let provider = MockProvider::new()
            .with_matches("sage#NA1", vec![make_match("Ascent", true, now(), 1, "s1")]);

        let summary = fetch_season_summary(&provider, &handle("sage#NA1"), &Default::default())
            .await
            .unwrap();

        assert_eq!(summary.matches_played, 1);
        assert_eq!(provider.requested_sizes(), vec![50]);
    }

    #[tokio::test]
    async fn test_map_stats_empty_history_is_no_data() {
        let provider = MockProvider::new();
        let summary = fetch_map_stats(&provider, &handle("sage#NA1"), &Default::default(), now())
            .await
            .unwrap();

        assert!(!summary.has_data());
        assert!(summary.best_map.is_none());
        assert_eq!(provider.requested_sizes(), vec![200]);
    }

    #[tokio::test]
    async fn test_team_stats_skip_failures_and_bad_handles() {
        let ten_ascent: Vec<_> = (0..10)
            .map(|i| make_match("Ascent", i % 2 == 0, now(), 1, "s1"))
            .collect();
        let provider = MockProvider::new()
            .with_matches("a#1", ten_ascent.clone())
            .with_matches("b#1", ten_ascent)
            .with_match_failure("c#1");

        let players = vec![
            Player::new("a#1", "A", "", now()),
            Player::new("b#1", "B", "", now()),
            Player::new("c#1", "C", "", now()),
            Player::new("broken", "D", "", now()),
        ];

        let team =
            fetch_team_map_stats(&provider, &players, &AggregationSettings::default(), now()).await;

        assert_eq!(team.contributors, 2);
        assert_eq!(team.team_map_stats["Ascent"].games, 20);
        assert_eq!(team.team_map_stats["Ascent"].wins, 10);
        assert_eq!(team.best_team_map.as_deref(), Some("Ascent"));
        assert_eq!(team.best_team_win_rate, 50.0);
        assert_eq!(provider.requested_handles(), vec!["a#1", "b#1", "c#1"]);
    }

    #[tokio::test]
    async fn test_team_stats_below_threshold() {
        let provider = MockProvider::new().with_matches(
            "a#1",
            (0..9).map(|_| make_match("Lotus", true, now(), 1, "s1")).collect(),
        );
        let players = vec![Player::new("a#1", "A", "", now())];

        let team =
            fetch_team_map_stats(&provider, &players, &AggregationSettings::default(), now()).await;

        assert_eq!(team.team_map_stats["Lotus"].games, 9);
        assert!(team.best_team_map.is_none());
        assert_eq!(team.best_team_win_rate, 0.0);
    }
}
