//! Leaderboard ordering.
//!
//! One parameterized ranking over the roster; each board is just a
//! different `RankingKey`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Player;

/// Size of the composite ("weekly best") podium.
pub const COMPOSITE_PODIUM: usize = 3;

const COMPOSITE_RATING_WEIGHT: f64 = 0.6;
const COMPOSITE_KD_WEIGHT: f64 = 0.4;

/// Which board to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingKey {
    /// Rating, then K/D
    #[default]
    Mmr,
    /// K/D, then rating
    Kd,
    /// Normalized blend of rating and K/D, podium only
    Composite,
}

impl fmt::Display for RankingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingKey::Mmr => write!(f, "mmr"),
            RankingKey::Kd => write!(f, "kd"),
            RankingKey::Composite => write!(f, "composite"),
        }
    }
}

impl FromStr for RankingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mmr" | "rating" => Ok(RankingKey::Mmr),
            "kd" => Ok(RankingKey::Kd),
            "composite" | "weekly" => Ok(RankingKey::Composite),
            other => Err(format!("Unknown ranking key: {}", other)),
        }
    }
}

fn by_rating(a: &Player, b: &Player) -> Ordering {
    b.mmr.cmp(&a.mmr).then_with(|| b.kd.total_cmp(&a.kd))
}

fn by_kd(a: &Player, b: &Player) -> Ordering {
    b.kd.total_cmp(&a.kd).then_with(|| b.mmr.cmp(&a.mmr))
}

/// Blend of rating and K/D, each scaled by the roster maximum.
pub fn composite_score(player: &Player, max_rating: u32, max_kd: f64) -> f64 {
    let rating = if max_rating > 0 {
        player.mmr as f64 / max_rating as f64
    } else {
        0.0
    };
    let kd = if max_kd > 0.0 { player.kd / max_kd } else { 0.0 };

    rating * COMPOSITE_RATING_WEIGHT + kd * COMPOSITE_KD_WEIGHT
}

/// Order players for a board. The sort is stable, so fully tied players keep
/// their stored order.
pub fn rank_players(mut players: Vec<Player>, key: RankingKey) -> Vec<Player> {
    match key {
        RankingKey::Mmr => players.sort_by(by_rating),
        RankingKey::Kd => players.sort_by(by_kd),
        RankingKey::Composite => {
            let max_rating = players.iter().map(|p| p.mmr).max().unwrap_or(0);
            let max_kd = players.iter().map(|p| p.kd).fold(0.0, f64::max);

            if max_rating > 0 || max_kd > 0.0 {
                players.sort_by(|a, b| {
                    composite_score(b, max_rating, max_kd)
                        .total_cmp(&composite_score(a, max_rating, max_kd))
                });
            }
            players.truncate(COMPOSITE_PODIUM);
        }
    }
    players
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn player(handle: &str, mmr: u32, kd: f64) -> Player {
        let mut p = Player::new(handle, handle, "", Utc::now());
        p.mmr = mmr;
        p.kd = kd;
        p
    }

    fn handles(players: &[Player]) -> Vec<&str> {
        players.iter().map(|p| p.handle.as_str()).collect()
    }

    #[test]
    fn test_rank_by_rating_then_kd() {
        let players = vec![
            player("a#1", 1200, 1.0),
            player("b#1", 1500, 0.8),
            player("c#1", 1200, 1.4),
        ];
        let ranked = rank_players(players, RankingKey::Mmr);
        assert_eq!(handles(&ranked), vec!["b#1", "c#1", "a#1"]);
    }

    #[test]
    fn test_rank_by_kd_then_rating() {
        let players = vec![
            player("a#1", 1000, 1.2),
            player("b#1", 1500, 1.2),
            player("c#1", 900, 2.0),
        ];
        let ranked = rank_players(players, RankingKey::Kd);
        assert_eq!(handles(&ranked), vec!["c#1", "b#1", "a#1"]);
    }

    #[test]
    fn test_composite_podium() {
        let players = vec![
            player("a#1", 1000, 2.0),
            player("b#1", 2000, 1.0),
            player("c#1", 500, 0.5),
            player("d#1", 1800, 1.8),
        ];
        let ranked = rank_players(players, RankingKey::Composite);
        // d: 0.54 + 0.36, b: 0.6 + 0.2, a: 0.3 + 0.4
        assert_eq!(handles(&ranked), vec!["d#1", "b#1", "a#1"]);
    }

    #[test]
    fn test_composite_all_zero_keeps_stored_order() {
        let players = vec![
            player("a#1", 0, 0.0),
            player("b#1", 0, 0.0),
            player("c#1", 0, 0.0),
            player("d#1", 0, 0.0),
        ];
        let ranked = rank_players(players, RankingKey::Composite);
        assert_eq!(handles(&ranked), vec!["a#1", "b#1", "c#1"]);
    }

    #[test]
    fn test_ranking_key_parse() {
        assert_eq!("KD".parse::<RankingKey>(), Ok(RankingKey::Kd));
        assert_eq!("weekly".parse::<RankingKey>(), Ok(RankingKey::Composite));
        assert!("elo".parse::<RankingKey>().is_err());
        assert_eq!(RankingKey::default().to_string(), "mmr");
    }
}
