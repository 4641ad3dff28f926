//! Translating finished games into statistics deltas.

use tracing::{debug, instrument};

use super::{GameResult, PlayerRecord, StatsError};
use crate::{Outcome, Player};

/// Maps a terminal outcome to a result label for the player holding
/// `perspective`.
///
/// The same game yields opposite labels for the two sides, so callers must
/// know which symbol the tracked player occupied. A draw is a tie for both.
#[instrument]
pub fn derive_result(outcome: Outcome, perspective: Player) -> GameResult {
    match outcome {
        Outcome::Draw => GameResult::Tie,
        Outcome::Winner(winner) if winner == perspective => GameResult::Win,
        Outcome::Winner(_) => GameResult::Loss,
    }
}

/// Returns `record` with one more game counted under `result`.
///
/// Only the matching counter and `total_games` change.
///
/// # Errors
///
/// Returns [`StatsError::CounterOverflow`] if either counter is already at
/// `u32::MAX`; the input record is never modified.
#[instrument(skip(record), fields(player_id = %record.id()))]
pub fn apply_result(record: &PlayerRecord, result: GameResult) -> Result<PlayerRecord, StatsError> {
    let mut updated = record.clone();
    let counter = updated.counter_mut(result);
    *counter = counter
        .checked_add(1)
        .ok_or(StatsError::CounterOverflow(result.as_str()))?;
    let total = updated.total_games_mut();
    *total = total
        .checked_add(1)
        .ok_or(StatsError::CounterOverflow("total_games"))?;

    debug!(
        wins = updated.wins(),
        losses = updated.losses(),
        ties = updated.ties(),
        total_games = updated.total_games(),
        "Result applied"
    );
    Ok(updated)
}
