//! Move rejection types.
//!
//! Rejections are expected, recoverable caller mistakes. Each variant
//! carries enough context to tell the caller exactly why the move failed.

use serde::Serialize;

use crate::Position;

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The requested index is outside 0-8.
    #[display("Position {_0} is out of range (must be 0-8)")]
    OutOfRange(i64),

    /// The square at the position is already occupied.
    #[display("Cell {_0} is already occupied")]
    Occupied(Position),

    /// The game has reached a terminal state.
    #[display("Game is already over")]
    GameOver,
}

impl std::error::Error for MoveError {}

/// Flag-plus-reason view of a move check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveValidation {
    /// Whether the move may be applied.
    pub valid: bool,
    /// Rejection reason, present only when `valid` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&Result<Position, MoveError>> for MoveValidation {
    fn from(result: &Result<Position, MoveError>) -> Self {
        match result {
            Ok(_) => Self {
                valid: true,
                reason: None,
            },
            Err(e) => Self {
                valid: false,
                reason: Some(e.to_string()),
            },
        }
    }
}
