//! Database models and their conversion to domain types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tictactoe_core::{GameResult, PlayerRecord};
use tracing::instrument;

use crate::db::{DbError, DbErrorKind, schema};

/// Player row as stored in the `players` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Getters)]
#[diesel(table_name = schema::players)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlayerRow {
    id: String,
    name: String,
    wins: i32,
    losses: i32,
    ties: i32,
    total_games: i32,
    created_at: NaiveDateTime,
}

#[track_caller]
fn to_counter(column: &str, value: i32) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|_| {
        DbError::new(
            DbErrorKind::CorruptRow,
            format!("Negative {} counter: {}", column, value),
        )
    })
}

#[track_caller]
fn to_column(column: &str, value: u32) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|_| {
        DbError::new(
            DbErrorKind::CorruptRow,
            format!("{} counter {} exceeds storage range", column, value),
        )
    })
}

impl TryFrom<PlayerRow> for PlayerRecord {
    type Error = DbError;

    #[instrument(skip(row), fields(player_id = %row.id))]
    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        Ok(PlayerRecord::new(
            row.id,
            row.name,
            to_counter("wins", row.wins)?,
            to_counter("losses", row.losses)?,
            to_counter("ties", row.ties)?,
            to_counter("total_games", row.total_games)?,
            row.created_at,
        ))
    }
}

impl TryFrom<&PlayerRecord> for PlayerRow {
    type Error = DbError;

    #[instrument(skip(record), fields(player_id = %record.id()))]
    fn try_from(record: &PlayerRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id().clone(),
            name: record.name().clone(),
            wins: to_column("wins", *record.wins())?,
            losses: to_column("losses", *record.losses())?,
            ties: to_column("ties", *record.ties())?,
            total_games: to_column("total_games", *record.total_games())?,
            created_at: *record.created_at(),
        })
    }
}

/// A game whose result has already been applied to a player's totals.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::recorded_games)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecordedGame {
    game_id: String,
    player_id: String,
    result: String,
    recorded_at: NaiveDateTime,
}

impl RecordedGame {
    /// Parses the stored result label.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored label is not `win`, `loss` or `tie`.
    #[instrument(skip(self), fields(result = %self.result))]
    pub fn parse_result(&self) -> Result<GameResult, DbError> {
        self.result
            .parse()
            .map_err(|e| DbError::new(DbErrorKind::CorruptRow, format!("{}", e)))
    }
}

/// Insertable marker for a newly recorded game.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::recorded_games)]
pub struct NewRecordedGame {
    game_id: String,
    player_id: String,
    result: String,
    recorded_at: NaiveDateTime,
}

/// Player totals after a result was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct RecordedResult {
    /// Updated player record.
    player: PlayerRecord,
    /// False when the game id had already been recorded and nothing changed.
    newly_recorded: bool,
}
