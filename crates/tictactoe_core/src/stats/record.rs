//! Player statistics record and result labels.

use std::str::FromStr;

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::StatsError;

/// Result of a finished game from one player's perspective.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameResult {
    /// The player won.
    Win,
    /// The player lost.
    Loss,
    /// The game was drawn.
    Tie,
}

impl GameResult {
    /// Label stored and accepted on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Tie => "tie",
        }
    }
}

impl FromStr for GameResult {
    type Err = StatsError;

    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Self::Win),
            "loss" => Ok(Self::Loss),
            "tie" => Ok(Self::Tie),
            other => Err(StatsError::UnrecognizedResult(other.to_string())),
        }
    }
}

/// Persisted player identity and running totals.
///
/// `total_games == wins + losses + ties` holds for every record produced by
/// this crate. Records loaded from storage are trusted to satisfy it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    id: String,
    name: String,
    wins: u32,
    losses: u32,
    ties: u32,
    total_games: u32,
    created_at: NaiveDateTime,
}

impl PlayerRecord {
    /// Creates a record with no games played.
    pub fn fresh(id: String, name: String, created_at: NaiveDateTime) -> Self {
        Self::new(id, name, 0, 0, 0, 0, created_at)
    }

    /// Returns true if the stored total matches the per-result counters.
    pub fn is_consistent(&self) -> bool {
        u64::from(self.wins) + u64::from(self.losses) + u64::from(self.ties)
            == u64::from(self.total_games)
    }

    pub(crate) fn counter_mut(&mut self, result: GameResult) -> &mut u32 {
        match result {
            GameResult::Win => &mut self.wins,
            GameResult::Loss => &mut self.losses,
            GameResult::Tie => &mut self.ties,
        }
    }

    pub(crate) fn total_games_mut(&mut self) -> &mut u32 {
        &mut self.total_games
    }
}
