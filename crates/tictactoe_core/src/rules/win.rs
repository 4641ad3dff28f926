//! Win detection logic for tic-tac-toe.

use super::draw::is_full;
use crate::engine::GameStatus;
use crate::{Board, Position, Square};
use tracing::instrument;

/// The eight winning lines in evaluation order: rows top to bottom,
/// columns left to right, then the 0-4-8 and 2-4-6 diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Evaluates the board.
///
/// Returns [`GameStatus::Won`] with the first complete line in [`LINES`]
/// order, [`GameStatus::Draw`] when the board is full without one, and
/// [`GameStatus::InProgress`] otherwise.
#[instrument(skip(board))]
pub fn check_for_win(board: &Board) -> GameStatus {
    for combo in LINES {
        let [a, b, c] = combo.map(|pos| board.get(pos));
        match a {
            Square::Occupied(player) if a == b && b == c => {
                return GameStatus::Won {
                    winner: player,
                    combo,
                };
            }
            _ => {}
        }
    }

    if is_full(board) {
        GameStatus::Draw
    } else {
        GameStatus::InProgress
    }
}
