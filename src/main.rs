//! tictactoe_stats - command-line entry point.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use tictactoe_core::LeaderboardLimit;
use tictactoe_stats::{AppState, PlayerRepository, PlayerService, ServerConfig, router};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tictactoe_stats=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            db_path,
        } => run_server(config, host, port, db_path).await,
        Command::Leaderboard { db_path, limit } => run_leaderboard(db_path, limit),
        Command::Migrate { db_path } => run_migrate(db_path),
    }
}

/// Run the REST server
#[instrument]
async fn run_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    db_path: Option<String>,
) -> Result<()> {
    let mut config = ServerConfig::load(config_path.as_deref())?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(db_path) = db_path {
        config = config.with_db_path(db_path);
    }

    let repository = PlayerRepository::new(config.db_path().clone())?;
    repository.run_migrations()?;

    let state = AppState::new(
        PlayerService::new(repository),
        config.session_manager(),
        config.default_limit(),
    );
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Print the leaderboard to stdout
#[instrument]
fn run_leaderboard(db_path: String, limit: Option<String>) -> Result<()> {
    let repository = PlayerRepository::new(db_path)?;
    repository.run_migrations()?;

    let limit = limit
        .as_deref()
        .map(LeaderboardLimit::parse)
        .unwrap_or_default();
    let entries = PlayerService::new(repository).leaderboard(limit)?;

    if entries.is_empty() {
        println!("No players yet.");
        return Ok(());
    }

    println!(
        "{:<4} {:<40} {:>5} {:>6} {:>5} {:>6} {:>7}",
        "#", "Name", "Wins", "Losses", "Ties", "Games", "Win %"
    );
    for (rank, entry) in entries.iter().enumerate() {
        println!(
            "{:<4} {:<40} {:>5} {:>6} {:>5} {:>6} {:>7}",
            rank + 1,
            entry.name(),
            entry.wins(),
            entry.losses(),
            entry.ties(),
            entry.total_games(),
            entry.win_rate(),
        );
    }
    Ok(())
}

/// Apply pending migrations
#[instrument]
fn run_migrate(db_path: String) -> Result<()> {
    let repository = PlayerRepository::new(db_path)?;
    let applied = repository.run_migrations()?;
    println!("Applied {} migration(s).", applied);
    Ok(())
}
