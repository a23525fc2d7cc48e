//! Relational match storage.
//!
//! SQLite through a bounded `sqlx` pool:
//! - Pool construction and schema bootstrap
//! - The [`Ledger`] service object owning all match mutations
//! - Row decoding into domain models

mod ledger;

pub use ledger::Ledger;

use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

use crate::calculate::ValidationError;
use crate::config::DatabaseConfig;
use crate::models::MatchId;

const SCHEMA: &str = include_str!("../../sql/001_schema.sql");

/// Errors surfaced by ledger operations. None are retried internally.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The match does not exist or does not hold a complete table.
    #[error("Match {0} not found")]
    NotFound(MatchId),

    /// Transaction failure, rollback, or pool exhaustion.
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Open the connection pool and apply the schema.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, LedgerError> {
    if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

    let pool = SqlitePoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect_with(options)
        .await?;

    sqlx::raw_sql(SCHEMA).execute(&pool).await?;

    info!(
        "Opened match database {:?} (pool {}..={})",
        config.path, config.min_connections, config.max_connections
    );
    Ok(pool)
}
