//! Player management business logic layer.

use tictactoe_core::{
    GameResult, LeaderboardEntry, LeaderboardLimit, PlayerRecord, derive_result, rank_leaderboard,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{MAX_NAME_LEN, NameError, ServiceError};
use crate::session::GameFinished;
use crate::{PlayerRepository, RecordedResult};

/// Trims `raw` and checks it is a usable player name.
///
/// # Errors
///
/// Returns [`NameError`] for empty or over-long names.
#[instrument]
pub fn validate_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong {
            max: MAX_NAME_LEN,
            len,
        });
    }
    Ok(name.to_string())
}

/// Service layer for player operations.
///
/// Wraps [`PlayerRepository`] with validation, not-found handling and the
/// translation of finished games into recorded results.
#[derive(Debug, Clone)]
pub struct PlayerService {
    repository: PlayerRepository,
}

impl PlayerService {
    /// Creates a new player service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: PlayerRepository) -> Self {
        info!("Creating PlayerService");
        Self { repository }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &PlayerRepository {
        &self.repository
    }

    /// Registers a new player.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidName`] for a malformed name,
    /// [`ServiceError::NameTaken`] if the name exists.
    #[instrument(skip(self))]
    pub fn create_player(&self, raw_name: &str) -> Result<PlayerRecord, ServiceError> {
        let name = validate_name(raw_name)?;
        debug!(name = %name, "Creating player");

        match self.repository.create_player(name) {
            Ok(player) => Ok(player),
            Err(e) if e.is_unique_violation() => {
                info!("Player name already taken");
                Err(ServiceError::NameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the player with the given id.
    ///
    /// # Errors
    ///
    /// [`ServiceError::PlayerNotFound`] if no such player exists.
    #[instrument(skip(self))]
    pub fn get_player(&self, id: &str) -> Result<PlayerRecord, ServiceError> {
        self.repository
            .load_player(id)?
            .ok_or(ServiceError::PlayerNotFound)
    }

    /// Lists all players, most wins first.
    #[instrument(skip(self))]
    pub fn list_players(&self) -> Result<Vec<PlayerRecord>, ServiceError> {
        Ok(self.repository.list_players()?)
    }

    /// Applies a result label to a player's totals.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidResult`] for a label other than `win`, `loss`
    /// or `tie`; [`ServiceError::PlayerNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn record_result(&self, player_id: &str, label: &str) -> Result<PlayerRecord, ServiceError> {
        let result: GameResult = label.parse()?;
        debug!(result = %result, "Recording result");

        self.repository
            .record_result(player_id, result, None)?
            .map(|recorded| recorded.player().clone())
            .ok_or(ServiceError::PlayerNotFound)
    }

    /// Records a finished game for its tracked player.
    ///
    /// Safe to retry: a game id already recorded leaves the totals unchanged.
    ///
    /// # Errors
    ///
    /// [`ServiceError::PlayerNotFound`] if the tracked player was removed.
    #[instrument(skip(self, event), fields(game_id = %event.game_id(), player_id = %event.player_id()))]
    pub fn record_game(&self, event: &GameFinished) -> Result<RecordedResult, ServiceError> {
        let result = derive_result(*event.outcome(), *event.perspective());
        debug!(outcome = %event.outcome(), perspective = %event.perspective(), result = %result, "Derived result");

        let recorded = self
            .repository
            .record_result(event.player_id(), result, Some(event.game_id()))?
            .ok_or_else(|| {
                warn!("Tracked player no longer exists");
                ServiceError::PlayerNotFound
            })?;

        if !recorded.newly_recorded() {
            info!("Duplicate game result ignored");
        }
        Ok(recorded)
    }

    /// Returns the ranked leaderboard.
    #[instrument(skip(self))]
    pub fn leaderboard(&self, limit: LeaderboardLimit) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let players = self.repository.list_players()?;
        Ok(rank_leaderboard(&players, limit))
    }
}
