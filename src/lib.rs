//! Tic-tac-toe backend with persistent player statistics.
//!
//! Game rules live in [`tictactoe_core`]; this crate adds storage, sessions
//! and the REST surface around them.
//!
//! # Architecture
//!
//! - **Db**: SQLite persistence for players and recorded games (diesel)
//! - **PlayerService**: validation and result bookkeeping over the repository
//! - **Session**: in-memory boards, one current game per session
//! - **Server**: axum router exposing players, games and the leaderboard
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_stats::{AppState, PlayerRepository, PlayerService, ServerConfig, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let repository = PlayerRepository::new(config.db_path().clone())?;
//! repository.run_migrations()?;
//!
//! let state = AppState::new(
//!     PlayerService::new(repository),
//!     config.session_manager(),
//!     config.default_limit(),
//! );
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! axum::serve(listener, router(state)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod db;
mod error;
mod player_service;
mod server;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Persistence
pub use db::{
    DbError, DbErrorKind, MIGRATIONS, NewRecordedGame, PlayerRepository, PlayerRow, RecordedGame,
    RecordedResult,
};

// Crate-level exports - Errors
pub use error::{MAX_NAME_LEN, NameError, ServiceError};

// Crate-level exports - Services
pub use player_service::{PlayerService, validate_name};

// Crate-level exports - Sessions
pub use session::{
    DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL, GameFinished, GameId, GameSession, SessionId,
    SessionManager, TrackedPlayer,
};

// Crate-level exports - HTTP
pub use server::{
    ApiJson, AppState, CreateGameRequest, CreatePlayerRequest, ErrorResponse, GameResponse,
    LeaderboardQuery, LeaderboardResponse, MakeMoveRequest, PlayerResponse, PlayersResponse,
    UpdateStatsRequest, router,
};
