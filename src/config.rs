//! Server configuration.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tictactoe_core::{DEFAULT_LEADERBOARD_LIMIT, LeaderboardLimit};
use tracing::{debug, info, instrument};

use crate::session::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL, SessionManager};

/// Configuration for the REST server.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    #[setters(into)]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// SQLite database file.
    #[serde(default = "default_db_path")]
    #[setters(into)]
    db_path: String,

    /// Leaderboard size when a request gives no usable limit.
    #[serde(default = "default_leaderboard_limit")]
    leaderboard_limit: i64,

    /// Most game sessions kept in memory at once.
    #[serde(default = "default_max_sessions")]
    max_sessions: usize,

    /// Seconds a session may sit idle before it is dropped.
    #[serde(default = "default_session_ttl_secs")]
    session_ttl_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "tictactoe.db".to_string()
}

fn default_leaderboard_limit() -> i64 {
    DEFAULT_LEADERBOARD_LIMIT as i64
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL.as_secs()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            leaderboard_limit: default_leaderboard_limit(),
            max_sessions: default_max_sessions(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, db_path = %config.db_path, "Config loaded");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads `path` if given, otherwise returns the defaults.
    ///
    /// A path that was given but does not exist is an error.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Default leaderboard limit as a validated value.
    pub fn default_limit(&self) -> LeaderboardLimit {
        LeaderboardLimit::new(self.leaderboard_limit)
    }

    /// Session manager sized by this configuration.
    pub fn session_manager(&self) -> SessionManager {
        SessionManager::with_limits(
            self.max_sessions,
            Duration::from_secs(self.session_ttl_secs),
        )
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.default_limit().get(), DEFAULT_LEADERBOARD_LIMIT);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = ServerConfig::from_toml("port = 8080\ndb_path = \"games.db\"\n").unwrap();
        assert_eq!(*config.port(), 8080);
        assert_eq!(config.db_path(), "games.db");
        assert_eq!(config.host(), "127.0.0.1");
    }

    #[test]
    fn test_non_positive_limit_falls_back() {
        let config = ServerConfig::default().with_leaderboard_limit(0);
        assert_eq!(config.default_limit().get(), DEFAULT_LEADERBOARD_LIMIT);
    }

    #[test]
    fn test_session_limits_from_toml() {
        let config = ServerConfig::from_toml("max_sessions = 5\nsession_ttl_secs = 30\n").unwrap();
        assert_eq!(*config.max_sessions(), 5);
        assert_eq!(*config.session_ttl_secs(), 30);

        let defaults = ServerConfig::default();
        assert_eq!(*defaults.max_sessions(), DEFAULT_MAX_SESSIONS);
        assert_eq!(*defaults.session_ttl_secs(), DEFAULT_SESSION_TTL.as_secs());
    }

    #[test]
    fn test_setters_chain() {
        let config = ServerConfig::default()
            .with_host("0.0.0.0")
            .with_port(9000);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let err = ServerConfig::from_toml("port = \"not a number\"").unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = ServerConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(result.is_err());
    }
}
