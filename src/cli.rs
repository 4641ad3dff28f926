//! Command-line interface for tictactoe_stats.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tic-tac-toe backend with player statistics and a leaderboard
#[derive(Parser, Debug)]
#[command(name = "tictactoe_stats")]
#[command(about = "Tic-tac-toe REST server with persistent player stats", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the REST server
    Serve {
        /// TOML config file; defaults apply when omitted
        #[arg(short, long, env = "TICTACTOE_CONFIG")]
        config: Option<PathBuf>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Path to the database file (overrides config)
        #[arg(long, env = "DATABASE_URL")]
        db_path: Option<String>,
    },

    /// Print the leaderboard
    Leaderboard {
        /// Path to the database file
        #[arg(long, env = "DATABASE_URL", default_value = "tictactoe.db")]
        db_path: String,

        /// Number of entries to show
        #[arg(short, long)]
        limit: Option<String>,
    },

    /// Apply pending database migrations
    Migrate {
        /// Path to the database file
        #[arg(long, env = "DATABASE_URL", default_value = "tictactoe.db")]
        db_path: String,
    },
}
