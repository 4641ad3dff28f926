//! Leaderboard ranking.

use std::cmp::Ordering;

use derive_getters::Getters;
use serde::Serialize;
use tracing::{debug, instrument};

use super::PlayerRecord;

/// Number of entries returned when no usable limit is supplied.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Maximum number of leaderboard entries to return. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeaderboardLimit(usize);

impl LeaderboardLimit {
    /// Uses `value` when positive, otherwise the default.
    pub fn new(value: i64) -> Self {
        usize::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .map_or_else(Self::default, Self)
    }

    /// Parses a raw query value.
    ///
    /// The leading integer is used (`"5"`, `" 7 "`, `"3rows"`); text with no
    /// leading digits and non-positive values fall back to the default.
    /// Positive values too large to represent saturate to `usize::MAX`.
    #[instrument]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let digits = &rest[..digits_end];

        if digits.is_empty() || negative {
            debug!(raw, "Unusable leaderboard limit, using default");
            return Self::default();
        }

        // Only overflow can fail here; the slice is non-empty ASCII digits.
        let value = digits.parse::<usize>().unwrap_or(usize::MAX);
        if value == 0 {
            debug!(raw, "Zero leaderboard limit, using default");
            return Self::default();
        }
        Self(value)
    }

    /// Returns the limit.
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for LeaderboardLimit {
    fn default() -> Self {
        Self(DEFAULT_LEADERBOARD_LIMIT)
    }
}

/// A ranked player with a formatted win rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    id: String,
    name: String,
    wins: u32,
    losses: u32,
    ties: u32,
    total_games: u32,
    win_rate: String,
}

impl From<&PlayerRecord> for LeaderboardEntry {
    fn from(record: &PlayerRecord) -> Self {
        Self {
            id: record.id().clone(),
            name: record.name().clone(),
            wins: *record.wins(),
            losses: *record.losses(),
            ties: *record.ties(),
            total_games: *record.total_games(),
            win_rate: format_win_rate(*record.wins(), *record.total_games()),
        }
    }
}

/// Formats `wins / total_games * 100` with exactly one decimal digit,
/// rounding halves up (`1/16` gives `"6.3"`).
///
/// Returns `"0.0"` when no games were played.
pub fn format_win_rate(wins: u32, total_games: u32) -> String {
    if total_games == 0 {
        return "0.0".to_string();
    }
    let wins = u64::from(wins);
    let total = u64::from(total_games);
    let tenths = (wins * 2000 + total) / (2 * total);
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// Orders by wins, then win rate (both descending), then name ascending.
fn rank_order(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    // Cross-multiplied so equal rates compare equal without float error.
    let rate_a = u64::from(*a.wins()) * u64::from(*b.total_games());
    let rate_b = u64::from(*b.wins()) * u64::from(*a.total_games());

    b.wins()
        .cmp(a.wins())
        .then_with(|| rate_b.cmp(&rate_a))
        .then_with(|| a.name().cmp(b.name()))
}

/// Ranks players who have completed at least one game.
///
/// Records with `total_games == 0` are excluded regardless of their other
/// counters. An empty input yields an empty leaderboard.
#[instrument(skip(records, limit), fields(records = records.len(), limit = limit.get()))]
pub fn rank_leaderboard(records: &[PlayerRecord], limit: LeaderboardLimit) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<&PlayerRecord> = records
        .iter()
        .filter(|record| *record.total_games() > 0)
        .collect();
    ranked.sort_by(|a, b| rank_order(a, b));

    let entries: Vec<LeaderboardEntry> = ranked
        .into_iter()
        .take(limit.get())
        .map(LeaderboardEntry::from)
        .collect();

    debug!(entries = entries.len(), "Leaderboard ranked");
    entries
}
