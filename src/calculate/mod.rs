//! Statistics aggregation.
//!
//! Pure folds over provider match lists:
//! - Per-map win/loss/kill/death tallies inside a lookback window
//! - Best-map selection with a minimum-games threshold
//! - Current-season counters and K/D
//! - Roster-wide map union
//!
//! Nothing in here performs I/O; callers pass `now` explicitly.

pub mod ranking;

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::models::{
    MapRecord, MapStatsSummary, PlayerMapStat, SeasonSummary, StoredMatch, TeamMapSummary,
};

/// Raw per-map tally before win rates are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapTally {
    pub wins: u32,
    pub games: u32,
    pub kills: u32,
    pub deaths: u32,
}

/// Whether the tracked player's side won more rounds. Draws are not wins.
/// A missing or unrecognised side counts as Blue.
pub fn match_won(m: &StoredMatch) -> bool {
    let red = m.teams.red.unwrap_or(0);
    let blue = m.teams.blue.unwrap_or(0);
    let on_red = m
        .stats
        .as_ref()
        .and_then(|s| s.team.as_deref())
        .is_some_and(|t| t.eq_ignore_ascii_case("red"));

    if on_red {
        red > blue
    } else {
        blue > red
    }
}

/// Win rate as a percentage.
pub fn win_rate(wins: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        wins as f64 * 100.0 / games as f64
    }
}

/// Kills over deaths rounded to two decimals. With zero deaths the raw kill
/// count is returned.
pub fn kill_death_ratio(kills: u32, deaths: u32) -> f64 {
    if deaths > 0 {
        round2(kills as f64 / deaths as f64)
    } else {
        kills as f64
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group matches started at or after `since` by map name.
/// Matches without a start time are skipped.
pub fn fold_map_tallies(
    matches: &[StoredMatch],
    since: DateTime<Utc>,
) -> BTreeMap<String, MapTally> {
    matches
        .iter()
        .filter(|m| m.meta.started_at.is_some_and(|t| t >= since))
        .fold(BTreeMap::new(), |mut acc, m| {
            let tally: &mut MapTally = acc.entry(m.map_name().to_string()).or_default();
            tally.games += 1;
            if match_won(m) {
                tally.wins += 1;
            }
            if let Some(stats) = &m.stats {
                tally.kills += stats.kills;
                tally.deaths += stats.deaths;
            }
            acc
        })
}

/// Highest win rate among maps with at least `min_games` games.
///
/// The running best starts at 0 and must be beaten strictly, so a map with
/// a 0% win rate is never picked and ties keep the earlier map in iteration
/// order.
pub fn pick_best_map<'a, I>(records: I, min_games: u32) -> Option<(String, f64)>
where
    I: IntoIterator<Item = (&'a str, u32, u32)>,
{
    let mut best: Option<(&str, f64)> = None;

    for (name, wins, games) in records {
        let rate = win_rate(wins, games);
        let current = best.map(|(_, r)| r).unwrap_or(0.0);
        if rate > current && games >= min_games {
            best = Some((name, rate));
        }
    }

    best.map(|(name, rate)| (name.to_string(), rate))
}

/// Per-map stats and best map over the `window_days` before `now`.
pub fn summarize_maps(
    matches: &[StoredMatch],
    now: DateTime<Utc>,
    window_days: i64,
    min_games: u32,
) -> MapStatsSummary {
    let since = now - Duration::days(window_days);
    let tallies = fold_map_tallies(matches, since);

    let total_games = tallies.values().map(|t| t.games).sum();
    let best = pick_best_map(
        tallies.iter().map(|(name, t)| (name.as_str(), t.wins, t.games)),
        min_games,
    );

    let map_stats = tallies
        .into_iter()
        .map(|(name, t)| {
            let stat = PlayerMapStat {
                wins: t.wins,
                games: t.games,
                win_rate: win_rate(t.wins, t.games),
            };
            (name, stat)
        })
        .collect();

    let (best_map, best_map_win_rate) = match best {
        Some((name, rate)) => (Some(name), rate),
        None => (None, 0.0),
    };

    MapStatsSummary {
        map_stats,
        best_map,
        best_map_win_rate,
        total_games,
    }
}

/// Sum counters over matches sharing the newest match's season.
///
/// The first element is taken to be the newest, as the provider returns
/// history newest-first. Returns `None` for an empty list.
pub fn summarize_season(matches: &[StoredMatch]) -> Option<SeasonSummary> {
    let current = matches.first()?.season_id();

    let mut summary = SeasonSummary::default();
    for m in matches.iter().filter(|m| m.season_id() == current) {
        summary.matches_played += 1;
        if let Some(stats) = &m.stats {
            summary.kills += stats.kills;
            summary.deaths += stats.deaths;
            summary.assists += stats.assists;
            summary.first_bloods += stats.first_bloods;
        }
    }
    summary.kd = kill_death_ratio(summary.kills, summary.deaths);

    Some(summary)
}

/// Union per-player map stats into team wins/games.
pub fn merge_team_maps<'a, I>(players: I) -> BTreeMap<String, MapRecord>
where
    I: IntoIterator<Item = &'a MapStatsSummary>,
{
    let mut team: BTreeMap<String, MapRecord> = BTreeMap::new();
    for summary in players {
        for (name, stat) in &summary.map_stats {
            let record = team.entry(name.clone()).or_default();
            record.wins += stat.wins;
            record.games += stat.games;
        }
    }
    team
}

/// Team-wide map union plus best team map.
pub fn summarize_team(players: &[MapStatsSummary], min_games: u32) -> TeamMapSummary {
    let team_map_stats = merge_team_maps(players);
    let best = pick_best_map(
        team_map_stats
            .iter()
            .map(|(name, r)| (name.as_str(), r.wins, r.games)),
        min_games,
    );
    let (best_team_map, best_team_win_rate) = match best {
        Some((name, rate)) => (Some(name), rate),
        None => (None, 0.0),
    };

    TeamMapSummary {
        team_map_stats,
        best_team_map,
        best_team_win_rate,
        contributors: players.len() as u32,
    }
}
