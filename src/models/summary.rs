//! Normalized results returned by the stats provider layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label used when the provider reports no competitive tier.
pub const UNRANKED: &str = "Unranked";

/// Current competitive standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub tier_label: String,
    pub tier_ordinal: u32,
    pub rating: u32,
}

impl Default for Rating {
    fn default() -> Self {
        Self {
            tier_label: UNRANKED.to_string(),
            tier_ordinal: 0,
            rating: 0,
        }
    }
}

/// Counters summed over the current season's fetched matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub matches_played: u32,
    pub kd: f64,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub first_bloods: u32,
}

/// A player's record on one map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerMapStat {
    pub wins: u32,
    pub games: u32,
    /// Percentage in `0..=100`
    pub win_rate: f64,
}

/// A team-wide record on one map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRecord {
    pub wins: u32,
    pub games: u32,
}

/// Per-map results over the lookback window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapStatsSummary {
    pub map_stats: BTreeMap<String, PlayerMapStat>,
    /// `None` when no map met the minimum-games threshold
    pub best_map: Option<String>,
    pub best_map_win_rate: f64,
    pub total_games: u32,
}

impl MapStatsSummary {
    pub fn has_data(&self) -> bool {
        !self.map_stats.is_empty()
    }
}

/// Map results unioned across the whole roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMapSummary {
    pub team_map_stats: BTreeMap<String, MapRecord>,
    pub best_team_map: Option<String>,
    pub best_team_win_rate: f64,
    /// Players whose map stats contributed
    pub contributors: u32,
}
