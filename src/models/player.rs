//! Tracked player model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Handle, HandleError, MapStatsSummary, PlayerMapStat, Rating, SeasonSummary, UNRANKED};

/// One tracked individual. Keyed by `handle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Provider account key, `name#tag`. Stored raw so malformed entries
    /// survive until someone fixes them.
    pub handle: String,

    /// Real name shown on the leaderboard
    pub display_name: String,

    /// Avatar path or URL
    pub avatar: String,

    /// Tier label, e.g. "Diamond 2"
    #[serde(default = "default_rank")]
    pub rank: String,

    #[serde(default)]
    pub rank_tier: u32,

    /// Matchmaking rating
    #[serde(default)]
    pub mmr: u32,

    #[serde(default)]
    pub kd: f64,

    #[serde(default)]
    pub matches_played: u32,

    #[serde(default)]
    pub kills: u32,

    #[serde(default)]
    pub deaths: u32,

    #[serde(default)]
    pub assists: u32,

    #[serde(default)]
    pub first_bloods: u32,

    #[serde(default)]
    pub map_stats: BTreeMap<String, PlayerMapStat>,

    #[serde(default)]
    pub best_map: Option<String>,

    #[serde(default)]
    pub best_map_win_rate: f64,

    /// Last time the update cycle (or an explicit upsert) touched this record
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

fn default_rank() -> String {
    UNRANKED.to_string()
}

impl Player {
    /// Create a player with zeroed live stats.
    pub fn new(
        handle: impl Into<String>,
        display_name: impl Into<String>,
        avatar: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            handle: handle.into(),
            display_name: display_name.into(),
            avatar: avatar.into(),
            rank: default_rank(),
            rank_tier: 0,
            mmr: 0,
            kd: 0.0,
            matches_played: 0,
            kills: 0,
            deaths: 0,
            assists: 0,
            first_bloods: 0,
            map_stats: BTreeMap::new(),
            best_map: None,
            best_map_win_rate: 0.0,
            last_updated: None,
            created_at: now,
        }
    }

    pub fn parse_handle(&self) -> Result<Handle, HandleError> {
        Handle::parse(&self.handle)
    }

    /// Write back one refresh. A `None` season leaves the season counters
    /// untouched.
    pub fn apply_refresh(
        &mut self,
        rating: Rating,
        season: Option<SeasonSummary>,
        maps: MapStatsSummary,
        now: DateTime<Utc>,
    ) {
        self.rank = rating.tier_label;
        self.rank_tier = rating.tier_ordinal;
        self.mmr = rating.rating;

        if let Some(season) = season {
            self.kd = season.kd;
            self.matches_played = season.matches_played;
            self.kills = season.kills;
            self.deaths = season.deaths;
            self.assists = season.assists;
            self.first_bloods = season.first_bloods;
        }

        self.map_stats = maps.map_stats;
        self.best_map = maps.best_map;
        self.best_map_win_rate = maps.best_map_win_rate;
        self.last_updated = Some(now);
    }

    /// Merge the present fields of a patch and stamp `last_updated`.
    pub fn apply_patch(&mut self, patch: PlayerPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.display_name {
            self.display_name = v;
        }
        if let Some(v) = patch.avatar {
            self.avatar = v;
        }
        if let Some(v) = patch.rank {
            self.rank = v;
        }
        if let Some(v) = patch.rank_tier {
            self.rank_tier = v;
        }
        if let Some(v) = patch.mmr {
            self.mmr = v;
        }
        if let Some(v) = patch.kd {
            self.kd = v;
        }
        if let Some(v) = patch.matches_played {
            self.matches_played = v;
        }
        if let Some(v) = patch.kills {
            self.kills = v;
        }
        if let Some(v) = patch.deaths {
            self.deaths = v;
        }
        if let Some(v) = patch.assists {
            self.assists = v;
        }
        if let Some(v) = patch.first_bloods {
            self.first_bloods = v;
        }
        if let Some(v) = patch.map_stats {
            self.map_stats = v;
        }
        if let Some(v) = patch.best_map {
            self.best_map = Some(v);
        }
        if let Some(v) = patch.best_map_win_rate {
            self.best_map_win_rate = v;
        }
        self.last_updated = Some(now);
    }
}

/// Partial player body accepted by the upsert endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerPatch {
    pub handle: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub rank: Option<String>,
    pub rank_tier: Option<u32>,
    pub mmr: Option<u32>,
    pub kd: Option<f64>,
    pub matches_played: Option<u32>,
    pub kills: Option<u32>,
    pub deaths: Option<u32>,
    pub assists: Option<u32>,
    pub first_bloods: Option<u32>,
    pub map_stats: Option<BTreeMap<String, PlayerMapStat>>,
    pub best_map: Option<String>,
    pub best_map_win_rate: Option<f64>,
}

/// One line of the onboarding manifest (`users.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "RiotUserName")]
    pub handle: String,

    #[serde(rename = "RealName")]
    pub display_name: String,

    #[serde(rename = "PhotoPath")]
    pub avatar: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_player_is_zeroed() {
        let player = Player::new("sage#NA1", "Alex", "/photos/alex.png", now());

        assert_eq!(player.rank, "Unranked");
        assert_eq!(player.mmr, 0);
        assert_eq!(player.kd, 0.0);
        assert!(player.map_stats.is_empty());
        assert!(player.best_map.is_none());
        assert!(player.last_updated.is_none());
    }

    #[test]
    fn test_apply_refresh_without_season_keeps_counters() {
        let mut player = Player::new("sage#NA1", "Alex", "", now());
        player.kills = 40;
        player.kd = 1.25;

        let rating = Rating {
            tier_label: "Gold 3".to_string(),
            tier_ordinal: 14,
            rating: 1150,
        };
        player.apply_refresh(rating, None, MapStatsSummary::default(), now());

        assert_eq!(player.rank, "Gold 3");
        assert_eq!(player.mmr, 1150);
        assert_eq!(player.kills, 40);
        assert_eq!(player.kd, 1.25);
        assert_eq!(player.last_updated, Some(now()));
    }

    #[test]
    fn test_apply_patch_only_touches_present_fields() {
        let mut player = Player::new("sage#NA1", "Alex", "/a.png", now());
        player.mmr = 900;

        let patch = PlayerPatch {
            handle: "sage#NA1".to_string(),
            avatar: Some("/b.png".to_string()),
            ..Default::default()
        };
        player.apply_patch(patch, now());

        assert_eq!(player.display_name, "Alex");
        assert_eq!(player.avatar, "/b.png");
        assert_eq!(player.mmr, 900);
        assert_eq!(player.last_updated, Some(now()));
    }

    #[test]
    fn test_manifest_entry_field_names() {
        let json = r#"{"RiotUserName": "sage#NA1", "RealName": "Alex", "PhotoPath": "/a.png"}"#;
        let entry: ManifestEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.handle, "sage#NA1");
        assert_eq!(entry.display_name, "Alex");
    }

    #[test]
    fn test_player_deserializes_with_missing_stats() {
        let json = r#"{
            "handle": "sage#NA1",
            "display_name": "Alex",
            "avatar": "",
            "created_at": "2026-10-01T12:00:00Z"
        }"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.rank, "Unranked");
        assert!(player.last_updated.is_none());
    }
}
