//! Roster-wide map aggregate.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MapRecord, TeamMapSummary};

/// The singleton team aggregate document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAggregate {
    pub team_map_stats: BTreeMap<String, MapRecord>,
    pub best_team_map: Option<String>,
    pub best_team_win_rate: f64,
    pub last_updated: DateTime<Utc>,
}

impl TeamAggregate {
    pub fn from_summary(summary: TeamMapSummary, now: DateTime<Utc>) -> Self {
        Self {
            team_map_stats: summary.team_map_stats,
            best_team_map: summary.best_team_map,
            best_team_win_rate: summary.best_team_win_rate,
            last_updated: now,
        }
    }
}
