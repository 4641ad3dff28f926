//! Database repository for player records.

use chrono::Utc;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tictactoe_core::{GameResult, PlayerRecord, apply_result};
use tracing::{debug, info, instrument, warn};

use crate::db::{
    DbError, DbErrorKind, NewRecordedGame, PlayerRow, RecordedGame, RecordedResult, schema,
};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database repository for player operations.
///
/// Each call opens its own SQLite connection. Writes that read and then
/// update a player run inside `BEGIN IMMEDIATE`, so concurrent updates for
/// the same player are serialized by SQLite's write lock.
#[derive(Debug, Clone)]
pub struct PlayerRepository {
    db_path: String,
}

impl PlayerRepository {
    /// Creates a repository for the database file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new(
                DbErrorKind::Connection,
                "Database path must not be empty",
            ));
        }
        info!(path = %db_path, "Creating PlayerRepository");
        Ok(Self { db_path })
    }

    /// Returns the database path.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })?;
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))?;
        Ok(conn)
    }

    /// Applies any pending schema migrations and returns how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }

    /// Inserts a new player with zeroed statistics.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with [`DbErrorKind::UniqueViolation`] if the name
    /// is already taken, or another [`DbError`] on database failure.
    #[instrument(skip(self))]
    pub fn create_player(&self, name: String) -> Result<PlayerRecord, DbError> {
        debug!(name = %name, "Creating player");
        let mut conn = self.connection()?;

        let record = PlayerRecord::fresh(
            uuid::Uuid::new_v4().to_string(),
            name,
            Utc::now().naive_utc(),
        );
        let row = PlayerRow::try_from(&record)?;

        diesel::insert_into(schema::players::table)
            .values(&row)
            .execute(&mut conn)?;

        info!(player_id = %record.id(), name = %record.name(), "Player created");
        Ok(record)
    }

    /// Loads a player by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn load_player(&self, id: &str) -> Result<Option<PlayerRecord>, DbError> {
        let mut conn = self.connection()?;
        Self::load_with(&mut conn, id)
    }

    fn load_with(conn: &mut SqliteConnection, id: &str) -> Result<Option<PlayerRecord>, DbError> {
        let row = schema::players::table
            .find(id)
            .select(PlayerRow::as_select())
            .first(conn)
            .optional()?;

        match row {
            Some(row) => {
                debug!(player_id = %id, "Player found");
                PlayerRecord::try_from(row).map(Some)
            }
            None => {
                debug!(player_id = %id, "Player not found");
                Ok(None)
            }
        }
    }

    /// Gets a player by name. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_player_by_name(&self, name: &str) -> Result<Option<PlayerRecord>, DbError> {
        debug!(name = %name, "Looking up player by name");
        let mut conn = self.connection()?;

        schema::players::table
            .filter(schema::players::name.eq(name))
            .select(PlayerRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(PlayerRecord::try_from)
            .transpose()
    }

    /// Lists all players ordered by wins (descending), then name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_players(&self) -> Result<Vec<PlayerRecord>, DbError> {
        debug!("Listing all players");
        let mut conn = self.connection()?;

        let rows = schema::players::table
            .order((schema::players::wins.desc(), schema::players::name.asc()))
            .select(PlayerRow::as_select())
            .load(&mut conn)?;

        let players = rows
            .into_iter()
            .map(PlayerRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = players.len(), "Players loaded");
        Ok(players)
    }

    /// Writes a record's counters back to storage.
    ///
    /// Returns `false` if no player with that id exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, record), fields(player_id = %record.id()))]
    pub fn save_player(&self, record: &PlayerRecord) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        Self::save_with(&mut conn, record)
    }

    fn save_with(conn: &mut SqliteConnection, record: &PlayerRecord) -> Result<bool, DbError> {
        use schema::players::dsl;

        let row = PlayerRow::try_from(record)?;
        let updated = diesel::update(dsl::players.find(row.id()))
            .set((
                dsl::wins.eq(row.wins()),
                dsl::losses.eq(row.losses()),
                dsl::ties.eq(row.ties()),
                dsl::total_games.eq(row.total_games()),
            ))
            .execute(conn)?;

        if updated == 0 {
            warn!(player_id = %record.id(), "Save matched no player");
        }
        Ok(updated > 0)
    }

    /// Applies `result` to a player's totals in one write transaction.
    ///
    /// When `game_id` is given, the game is recorded in `recorded_games` and a
    /// repeat call with the same id leaves the totals untouched and returns
    /// the current record with `newly_recorded == false`. Returns `None` if
    /// the player does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs; nothing is written.
    #[instrument(skip(self))]
    pub fn record_result(
        &self,
        player_id: &str,
        result: GameResult,
        game_id: Option<&str>,
    ) -> Result<Option<RecordedResult>, DbError> {
        let mut conn = self.connection()?;

        conn.immediate_transaction(|conn| {
            let Some(current) = Self::load_with(conn, player_id)? else {
                warn!(player_id = %player_id, "Cannot record result for unknown player");
                return Ok(None);
            };

            if let Some(game_id) = game_id {
                if Self::find_recorded_game(conn, game_id)?.is_some() {
                    info!(game_id = %game_id, "Game already recorded, skipping");
                    return Ok(Some(RecordedResult::new(current, false)));
                }
            }

            let updated = apply_result(&current, result)
                .map_err(|e| DbError::new(DbErrorKind::Overflow, e.to_string()))?;
            Self::save_with(conn, &updated)?;

            if let Some(game_id) = game_id {
                let marker = NewRecordedGame::new(
                    game_id.to_string(),
                    player_id.to_string(),
                    result.as_str().to_string(),
                    Utc::now().naive_utc(),
                );
                diesel::insert_into(schema::recorded_games::table)
                    .values(&marker)
                    .execute(conn)?;
            }

            info!(
                player_id = %player_id,
                result = %result,
                wins = updated.wins(),
                losses = updated.losses(),
                ties = updated.ties(),
                total_games = updated.total_games(),
                "Result recorded"
            );
            Ok(Some(RecordedResult::new(updated, true)))
        })
    }

    /// Looks up a recorded game by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_recorded_game(&self, game_id: &str) -> Result<Option<RecordedGame>, DbError> {
        let mut conn = self.connection()?;
        Self::find_recorded_game(&mut conn, game_id)
    }

    fn find_recorded_game(
        conn: &mut SqliteConnection,
        game_id: &str,
    ) -> Result<Option<RecordedGame>, DbError> {
        Ok(schema::recorded_games::table
            .find(game_id)
            .select(RecordedGame::as_select())
            .first(conn)
            .optional()?)
    }

    /// Lists the games recorded for a player, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_recorded_games(&self, player_id: &str) -> Result<Vec<RecordedGame>, DbError> {
        let mut conn = self.connection()?;

        let games = schema::recorded_games::table
            .filter(schema::recorded_games::player_id.eq(player_id))
            .order(schema::recorded_games::recorded_at.desc())
            .select(RecordedGame::as_select())
            .load(&mut conn)?;

        debug!(player_id = %player_id, count = games.len(), "Recorded games loaded");
        Ok(games)
    }
}
