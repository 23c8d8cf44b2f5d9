//! Provider wire types for rating and match-history responses.
//!
//! These are transient: they are folded into player aggregates and never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard `{ "status": .., "data": .. }` envelope used by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: Option<u16>,
    pub data: Option<T>,
}

/// Payload of the MMR endpoint. Every field may be absent for unranked
/// accounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MmrData {
    #[serde(default)]
    pub currenttier: Option<u32>,
    #[serde(default)]
    pub currenttierpatched: Option<String>,
    #[serde(default)]
    pub ranking_in_tier: Option<u32>,
    #[serde(default)]
    pub elo: Option<u32>,
}

/// One entry of the stored-matches endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMatch {
    pub meta: MatchMeta,
    #[serde(default)]
    pub stats: Option<MatchPlayerStats>,
    #[serde(default)]
    pub teams: RoundWins,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchMeta {
    #[serde(default)]
    pub id: Option<String>,
    pub map: MapRef,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub season: Option<SeasonRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRef {
    pub id: String,
}

/// Counters for the tracked player in one match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchPlayerStats {
    /// "Red" or "Blue"
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub first_bloods: u32,
}

/// Rounds won by each side.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RoundWins {
    #[serde(default)]
    pub red: Option<u32>,
    #[serde(default)]
    pub blue: Option<u32>,
}

impl StoredMatch {
    pub fn season_id(&self) -> Option<&str> {
        self.meta.season.as_ref().map(|s| s.id.as_str())
    }

    pub fn map_name(&self) -> &str {
        &self.meta.map.name
    }
}
