//! Pure tic-tac-toe engine and player statistics aggregation.
//!
//! # Architecture
//!
//! - **Engine**: board state, move legality, win/draw detection, turn switching
//! - **Stats**: result labels, per-game record updates, leaderboard ranking
//!
//! Both halves are synchronous and free of I/O. State is passed in and
//! returned explicitly; nothing is cached between calls.
//!
//! # Example
//!
//! ```
//! use tictactoe_core::{Outcome, Player, create_initial_game_state};
//!
//! let mut state = create_initial_game_state();
//! for pos in [0, 4, 1, 5, 2] {
//!     state = state.play(pos).unwrap();
//! }
//! assert_eq!(state.outcome(), Some(Outcome::Winner(Player::X)));
//! assert_eq!(state.current_player(), Player::X);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod engine;
pub mod rules;
mod stats;
mod types;

pub use action::{MoveError, MoveValidation};
pub use engine::{
    GameState, GameStateView, GameStatus, apply_move, create_initial_game_state, is_valid_move,
    switch_player,
};
pub use rules::check_for_win;
pub use stats::{
    DEFAULT_LEADERBOARD_LIMIT, GameResult, LeaderboardEntry, LeaderboardLimit, PlayerRecord,
    StatsError, apply_result, derive_result, format_win_rate, rank_leaderboard,
};
pub use types::{Board, Outcome, Player, Position, Square};
