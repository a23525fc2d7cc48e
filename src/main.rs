use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mahjong_ledger::api::state::AppState;
use mahjong_ledger::api::{build_router, cors_layer};
use mahjong_ledger::calculate::{parse_entry, parse_seat_score};
use mahjong_ledger::config::AppConfig;
use mahjong_ledger::models::{MatchId, MatchResult, PlayerId};
use mahjong_ledger::storage::Ledger;

#[derive(Parser)]
#[command(name = "mahjong-ledger")]
#[command(about = "Four-player mahjong match ledger and leaderboard")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Database file (overrides config)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Config,

    #[command(flatten)]
    Ledger(LedgerCommand),
}

/// Commands that open the match database.
#[derive(Subcommand)]
enum LedgerCommand {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Record a match: four `--entry SEAT:PLAYER:SCORE`
    Record {
        #[arg(long = "entry", required = true)]
        entries: Vec<String>,
    },

    /// Show a match with placements and points
    Show { id: i64 },

    /// Replace a match's scores: four `--score SEAT:SCORE`
    Edit {
        id: i64,

        #[arg(long = "score", required = true)]
        scores: Vec<String>,
    },

    /// Delete a match
    Delete { id: i64 },

    /// Show the leaderboard
    Leaderboard {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show a player's recent matches
    History {
        player: i64,

        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(Some(&cli.config))
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(path) = &cli.database {
        config.database.path = path.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let command = match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
            return Ok(());
        }
        Commands::Ledger(command) => command,
    };

    let ledger = Ledger::open(&config.database, config.scoring.rules()).await?;
    let result = run(command, &ledger, &config).await;
    ledger.close().await;
    result
}

async fn run(command: LedgerCommand, ledger: &Ledger, config: &AppConfig) -> Result<()> {
    match command {
        LedgerCommand::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let app = build_router(AppState::new(ledger.clone()))
                .layer(cors_layer(&config.server.cors_origin)?);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        LedgerCommand::Record { entries } => {
            let participants = entries
                .iter()
                .map(|e| parse_entry(e))
                .collect::<Result<Vec<_>, _>>()?;
            let match_id = ledger.create_match(&participants).await?;
            println!("Recorded match {}", match_id);
            print_match(&ledger.match_result(match_id).await?);
        }
        LedgerCommand::Show { id } => {
            print_match(&ledger.match_result(MatchId::new(id)).await?);
        }
        LedgerCommand::Edit { id, scores } => {
            let scores = scores
                .iter()
                .map(|s| parse_seat_score(s))
                .collect::<Result<Vec<_>, _>>()?;
            let match_id = MatchId::new(id);
            ledger.update_match(match_id, &scores).await?;
            println!("Updated match {}", match_id);
            print_match(&ledger.match_result(match_id).await?);
        }
        LedgerCommand::Delete { id } => {
            let match_id = MatchId::new(id);
            let removed = ledger.delete_match(match_id).await?;
            if removed == 0 {
                println!("Match {} did not exist", match_id);
            } else {
                println!("Deleted match {}", match_id);
            }
        }
        LedgerCommand::Leaderboard { limit } => {
            let standings = ledger.leaderboard(limit).await?;
            if standings.is_empty() {
                println!("No matches recorded.");
            } else {
                println!("=== Leaderboard ===\n");
                for (i, s) in standings.iter().enumerate() {
                    println!(
                        "{:>3}. player {:<20} total {:>+8.1}  matches {:>4}  avg {:>+7.2}",
                        i + 1,
                        s.player_id,
                        s.total_points,
                        s.match_count,
                        s.average_points()
                    );
                }
            }
        }
        LedgerCommand::History { player, limit } => {
            let history = ledger.player_history(PlayerId::new(player), limit).await?;
            if history.is_empty() {
                println!("No matches for player {}.", player);
            } else {
                println!("=== Player {} ({} matches) ===\n", player, history.len());
                for h in &history {
                    println!(
                        "  {:<8} {:<6} {:>7}  place {}  {:>+7.1}",
                        h.match_id,
                        h.seat,
                        h.score,
                        h.placement.number(),
                        h.points
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_match(result: &MatchResult) {
    println!("\n=== Match {} ({}) ===", result.match_id, result.created_at);
    for s in &result.standings {
        println!(
            "  {}. {:<6} player {:<20} {:>7}  {:>+7.1}",
            s.placement.number(),
            s.seat,
            s.player_id,
            s.score,
            s.points
        );
    }
    println!("  total {}", result.total_score);
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_is_not_a_ledger_command() {
        let cli = Cli::try_parse_from(["mahjong-ledger", "config"]).unwrap();
        assert!(matches!(cli.command, Commands::Config));

        let cli = Cli::try_parse_from(["mahjong-ledger", "leaderboard", "--limit", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Ledger(LedgerCommand::Leaderboard { limit: 3 })
        ));
    }

    #[test]
    fn test_record_takes_repeated_entries() {
        let cli = Cli::try_parse_from([
            "mahjong-ledger",
            "record",
            "--entry",
            "east:1:40000",
            "--entry",
            "south:2:30000",
            "--entry",
            "west:3:20000",
            "--entry",
            "north:4:10000",
        ])
        .unwrap();
        match cli.command {
            Commands::Ledger(LedgerCommand::Record { entries }) => assert_eq!(entries.len(), 4),
            _ => panic!("expected record"),
        }
    }
}
