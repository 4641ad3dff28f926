//! Database persistence layer for player records and recorded games.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{NewRecordedGame, PlayerRow, RecordedGame, RecordedResult};
pub use repository::{MIGRATIONS, PlayerRepository};
