//! # Squad Board
//!
//! Leaderboard service for a fixed roster of Valorant players.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, handles, provider payloads)
//! - **provider**: Stats provider client and derived season/map reads
//! - **calculate**: Pure aggregation folds and leaderboard ranking
//! - **storage**: File-backed document store
//! - **update**: One-player-per-tick update cycle and its scheduler
//! - **seed**: Roster onboarding from the JSON manifest
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod provider;
pub mod seed;
pub mod storage;
pub mod update;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "5m", "1h", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier): (&str, u64) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num.checked_mul(multiplier)?))
}
