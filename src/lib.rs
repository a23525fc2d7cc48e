//! # Mahjong Ledger
//!
//! Records four-player riichi mahjong match results and keeps a running
//! leaderboard.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (matches, seats, placements, standings)
//! - **calculate**: Score validation, placement ranking, point conversion, aggregation
//! - **storage**: SQLite match ledger behind a bounded connection pool
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
