//! Player statistics: result labels, per-game deltas and leaderboard ranking.
//!
//! Nothing here touches storage. Callers load a [`PlayerRecord`], compute the
//! updated value, and persist it under whatever serialization their store
//! provides for concurrent writes to the same player.

mod aggregator;
mod error;
mod leaderboard;
mod record;

pub use aggregator::{apply_result, derive_result};
pub use error::StatsError;
pub use leaderboard::{
    DEFAULT_LEADERBOARD_LIMIT, LeaderboardEntry, LeaderboardLimit, format_win_rate,
    rank_leaderboard,
};
pub use record::{GameResult, PlayerRecord};
