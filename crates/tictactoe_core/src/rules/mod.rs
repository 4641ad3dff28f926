//! Game rules for tic-tac-toe.
//!
//! Pure functions for evaluating a board. Rules are separated from board
//! storage so the engine can compose them.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, check_for_win};
