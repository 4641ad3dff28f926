//! Game engine: move validation, move application and turn switching.
//!
//! Every operation is a pure function of its arguments. A [`GameState`] is
//! never mutated in place; each accepted move yields a new value.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::action::MoveError;
use crate::rules::check_for_win;
use crate::{Board, Outcome, Player, Position, Square};

/// Phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// Moves may still be made.
    InProgress,
    /// `winner` completed the line `combo`.
    Won {
        /// Player who completed the line.
        winner: Player,
        /// Indices of the completed line.
        combo: [Position; 3],
    },
    /// Board filled without a completed line.
    Draw,
}

impl GameStatus {
    /// Returns true for `Won` and `Draw`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Returns the terminal outcome, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::Won { winner, .. } => Some(Outcome::Winner(*winner)),
            GameStatus::Draw => Some(Outcome::Draw),
        }
    }

    /// Returns the completed line for a won game.
    pub fn winning_combo(&self) -> Option<[Position; 3]> {
        match self {
            GameStatus::Won { combo, .. } => Some(*combo),
            _ => None,
        }
    }
}

/// Complete game state.
///
/// Serializes to `{board, currentPlayer, gameOver, winner, winningCombo}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "GameStateView")]
pub struct GameState {
    board: Board,
    current_player: Player,
    status: GameStatus,
}

impl GameState {
    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move, or the winner once the game is won.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Returns the game status.
    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    /// True once the game is won or drawn.
    pub fn game_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Terminal outcome, `None` while in progress.
    pub fn outcome(&self) -> Option<Outcome> {
        self.status.outcome()
    }

    /// Completed line, present only when a player has won.
    pub fn winning_combo(&self) -> Option<[Position; 3]> {
        self.status.winning_combo()
    }

    /// Plays `position` for the current player and returns the next state.
    ///
    /// The current player is kept when the move ends the game, so a winner
    /// stays current for display. Otherwise the turn passes to the opponent.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::GameOver`] on a terminal state, or the
    /// [`is_valid_move`] rejection for the position.
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub fn play(&self, position: i64) -> Result<GameState, MoveError> {
        if self.game_over() {
            debug!("Move rejected, game is over");
            return Err(MoveError::GameOver);
        }

        let pos = is_valid_move(&self.board, position)?;
        let board = apply_move(&self.board, pos, self.current_player);
        let status = check_for_win(&board);

        let current_player = if status.is_terminal() {
            self.current_player
        } else {
            switch_player(self.current_player)
        };

        debug!(position = %pos, status = ?status, "Move applied");
        Ok(GameState {
            board,
            current_player,
            status,
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        create_initial_game_state()
    }
}

/// Wire shape of a [`GameState`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    board: Board,
    current_player: Player,
    game_over: bool,
    winner: Option<Outcome>,
    winning_combo: Option<[Position; 3]>,
}

impl From<GameState> for GameStateView {
    fn from(state: GameState) -> Self {
        Self {
            game_over: state.game_over(),
            winner: state.outcome(),
            winning_combo: state.winning_combo(),
            board: state.board,
            current_player: state.current_player,
        }
    }
}

/// Creates a fresh game: empty board, X to move.
#[instrument]
pub fn create_initial_game_state() -> GameState {
    GameState {
        board: Board::new(),
        current_player: Player::X,
        status: GameStatus::InProgress,
    }
}

/// Checks that `position` is on the board and its cell is empty.
///
/// # Errors
///
/// [`MoveError::OutOfRange`] outside 0-8, [`MoveError::Occupied`] for a
/// filled cell.
#[instrument(skip(board))]
pub fn is_valid_move(board: &Board, position: i64) -> Result<Position, MoveError> {
    let pos = usize::try_from(position)
        .ok()
        .and_then(Position::from_index)
        .ok_or(MoveError::OutOfRange(position))?;

    if !board.is_empty(pos) {
        return Err(MoveError::Occupied(pos));
    }

    Ok(pos)
}

/// Returns a copy of `board` with `player` placed at `position`.
///
/// The input board is left untouched. Callers must validate the position
/// with [`is_valid_move`] first; the cell being empty is not rechecked in
/// release builds.
#[instrument(skip(board))]
pub fn apply_move(board: &Board, position: Position, player: Player) -> Board {
    debug_assert!(board.is_empty(position), "apply_move on occupied cell");
    let mut next = board.clone();
    next.set(position, Square::Occupied(player));
    next
}

/// Returns the other player.
pub fn switch_player(player: Player) -> Player {
    player.opponent()
}
