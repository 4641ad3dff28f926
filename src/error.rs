//! Service-level error types.

use derive_more::{Display, From};
use tictactoe_core::{MoveError, StatsError};

use crate::DbError;

/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 40;

/// Why a player name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum NameError {
    /// Name is empty after trimming.
    #[display("Name is required")]
    Empty,
    /// Name is longer than [`MAX_NAME_LEN`].
    #[display("Name must be at most {max} characters (got {len})")]
    TooLong {
        /// Maximum length.
        max: usize,
        /// Submitted length.
        len: usize,
    },
}

impl std::error::Error for NameError {}

/// Errors surfaced by the player service and game sessions.
#[derive(Debug, Clone, Display, From)]
pub enum ServiceError {
    /// Malformed player name.
    #[from]
    #[display("{_0}")]
    InvalidName(NameError),

    /// Unrecognized result label.
    #[from]
    #[display("{_0}")]
    InvalidResult(StatsError),

    /// Rejected move.
    #[from]
    #[display("{_0}")]
    InvalidMove(MoveError),

    /// Request body is not JSON of the expected shape.
    #[display("Invalid request body: {_0}")]
    MalformedBody(String),

    /// Request body lacked a required field.
    #[display("{_0} is required")]
    MissingField(&'static str),

    /// Another player already uses the name.
    #[display("Player name already exists")]
    NameTaken,

    /// No player with the given id.
    #[display("Player not found")]
    PlayerNotFound,

    /// No game session with the given id.
    #[display("Game not found")]
    GameNotFound,

    /// Storage failure.
    #[from]
    #[display("{_0}")]
    Database(DbError),

    /// A blocking task panicked or was cancelled.
    #[display("Background task failed: {_0}")]
    Task(String),
}

impl std::error::Error for ServiceError {}
