//! In-memory game sessions.
//!
//! A session holds the current [`GameState`] for one board and, optionally,
//! the persisted player whose statistics the game counts toward. The engine
//! itself keeps no state; sessions pass each state in and store the result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use derive_getters::Getters;
use derive_new::new;
use serde::Serialize;
use tictactoe_core::{GameState, Outcome, Player, create_initial_game_state};
use tracing::{debug, info, instrument, warn};

use crate::error::ServiceError;

/// Unique identifier for a session (stable across resets).
pub type SessionId = String;

/// Unique identifier for one game played in a session.
pub type GameId = String;

/// The persisted player a session counts results for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPlayer {
    /// Player record id.
    player_id: String,
    /// Symbol the player occupies on this board.
    perspective: Player,
}

/// Emitted once a tracked game reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct GameFinished {
    /// Game that finished; used as the idempotency key when recording.
    game_id: GameId,
    /// Player whose totals change.
    player_id: String,
    /// How the game ended.
    outcome: Outcome,
    /// Symbol the player occupied.
    perspective: Player,
}

/// One board and its bookkeeping.
#[derive(Debug, Clone, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    session_id: SessionId,
    game_id: GameId,
    tracked: Option<TrackedPlayer>,
    state: GameState,
    stats_recorded: bool,
    #[serde(skip)]
    #[getter(skip)]
    last_active: Instant,
}

fn new_game_id() -> GameId {
    uuid::Uuid::new_v4().to_string()
}

impl GameSession {
    /// Creates a session with a fresh game.
    #[instrument]
    pub fn new(tracked: Option<TrackedPlayer>) -> Self {
        let session = Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            game_id: new_game_id(),
            tracked,
            state: create_initial_game_state(),
            stats_recorded: false,
            last_active: Instant::now(),
        };
        info!(session_id = %session.session_id, game_id = %session.game_id, "Game session created");
        session
    }

    /// Plays `position` for the current player.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidMove`] for a rejected move; the session
    /// is unchanged in that case.
    #[instrument(skip(self), fields(session_id = %self.session_id, game_id = %self.game_id))]
    pub fn play(&mut self, position: i64) -> Result<(), ServiceError> {
        let next = self.state.play(position).map_err(|e| {
            warn!(position, error = %e, "Invalid move");
            ServiceError::InvalidMove(e)
        })?;
        self.state = next;

        if let Some(outcome) = self.state.outcome() {
            info!(outcome = %outcome, "Game finished");
        }
        Ok(())
    }

    /// Returns the terminal event still waiting to be recorded.
    ///
    /// `None` while the game is in progress, for untracked sessions, and once
    /// [`GameSession::mark_recorded`] has been called for this game.
    pub fn pending_result(&self) -> Option<GameFinished> {
        if self.stats_recorded {
            return None;
        }
        let tracked = self.tracked.as_ref()?;
        let outcome = self.state.outcome()?;
        Some(GameFinished::new(
            self.game_id.clone(),
            tracked.player_id().clone(),
            outcome,
            *tracked.perspective(),
        ))
    }

    /// Marks `game_id` as recorded. Ignored if the session has since been
    /// reset to a different game.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn mark_recorded(&mut self, game_id: &str) {
        if self.game_id == game_id {
            self.stats_recorded = true;
        } else {
            debug!(current = %self.game_id, "Stale game id, not marking");
        }
    }

    /// Discards the current game and starts a new one under a new game id.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn reset(&mut self) {
        self.game_id = new_game_id();
        self.state = create_initial_game_state();
        self.stats_recorded = false;
        info!(game_id = %self.game_id, "Game reset");
    }

    /// Time since the session was last read or changed.
    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

/// Default cap on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default idle time after which a session is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Manages all game sessions.
///
/// The map is bounded: sessions idle longer than the TTL are dropped whenever
/// a new one is created, and at capacity the least recently active session
/// is evicted. Evicting a finished game whose result is still pending loses
/// that result.
#[derive(Debug, Clone)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<SessionId, GameSession>>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL)
    }
}

impl SessionManager {
    /// Creates a new session manager with the default limits.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self::default()
    }

    /// Creates a session manager holding at most `max_sessions` sessions,
    /// each kept for at most `idle_ttl` without activity.
    ///
    /// A `max_sessions` of zero is treated as one.
    #[instrument]
    pub fn with_limits(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, GameSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a session and returns a snapshot of it.
    #[instrument(skip(self))]
    pub fn create_session(&self, tracked: Option<TrackedPlayer>) -> GameSession {
        let session = GameSession::new(tracked);
        let mut sessions = self.lock();

        let before = sessions.len();
        sessions.retain(|_, s| s.idle_for() < self.idle_ttl);
        if sessions.len() < before {
            debug!(expired = before - sessions.len(), "Dropped idle sessions");
        }

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .values()
                .min_by_key(|s| s.last_active)
                .map(|s| s.session_id.clone());
            match oldest {
                Some(id) => {
                    warn!(session_id = %id, "Session limit reached, evicting");
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        sessions.insert(session.session_id.clone(), session.clone());
        session
    }

    /// Gets a snapshot of a session by id.
    #[instrument(skip(self))]
    pub fn get_session(&self, id: &str) -> Option<GameSession> {
        let mut sessions = self.lock();
        match sessions.get_mut(id) {
            Some(session) => {
                session.touch();
                Some(session.clone())
            }
            None => {
                debug!(session_id = id, "Session not found");
                None
            }
        }
    }

    /// Removes a session and returns its final snapshot.
    ///
    /// # Errors
    ///
    /// [`ServiceError::GameNotFound`] for an unknown session.
    #[instrument(skip(self))]
    pub fn remove_session(&self, id: &str) -> Result<GameSession, ServiceError> {
        let removed = self.lock().remove(id).ok_or_else(|| {
            debug!(session_id = id, "Session not found");
            ServiceError::GameNotFound
        })?;
        info!(session_id = id, "Game session removed");
        Ok(removed)
    }

    /// Runs `f` on a session while holding the lock and returns a snapshot.
    fn with_session<F>(&self, id: &str, f: F) -> Result<GameSession, ServiceError>
    where
        F: FnOnce(&mut GameSession) -> Result<(), ServiceError>,
    {
        let mut sessions = self.lock();
        let session = sessions.get_mut(id).ok_or_else(|| {
            debug!(session_id = id, "Session not found");
            ServiceError::GameNotFound
        })?;
        f(session)?;
        session.touch();
        Ok(session.clone())
    }

    /// Plays a move in a session.
    ///
    /// # Errors
    ///
    /// [`ServiceError::GameNotFound`] for an unknown session,
    /// [`ServiceError::InvalidMove`] for a rejected move.
    #[instrument(skip(self))]
    pub fn play(&self, id: &str, position: i64) -> Result<GameSession, ServiceError> {
        self.with_session(id, |session| session.play(position))
    }

    /// Resets a session to a fresh game.
    #[instrument(skip(self))]
    pub fn reset(&self, id: &str) -> Result<GameSession, ServiceError> {
        self.with_session(id, |session| {
            session.reset();
            Ok(())
        })
    }

    /// Marks a session's game as recorded.
    #[instrument(skip(self))]
    pub fn mark_recorded(&self, id: &str, game_id: &str) -> Result<GameSession, ServiceError> {
        self.with_session(id, |session| {
            session.mark_recorded(game_id);
            Ok(())
        })
    }

    /// Lists all session ids.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<SessionId> {
        let ids: Vec<_> = self.lock().keys().cloned().collect();
        debug!(count = ids.len(), "Listed sessions");
        ids
    }
}
