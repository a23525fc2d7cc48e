//! Scoring engine.
//!
//! Pure functions over match data:
//! - Score validation against the configured table total
//! - Placement resolution with the seat tie-break sequence
//! - Raw score to league point conversion
//! - Leaderboard and player history folds

pub mod aggregate;
pub mod points;
pub mod rank;
pub mod validate;

pub use aggregate::{aggregate, compare_standings, complete_match, group_by_match, player_history};
pub use points::{PointFormula, ScoringRules};
pub use rank::{compare_for_rank, rank, Ranked};
pub use validate::{
    parse_entry, parse_score, parse_seat, parse_seat_score, validate_participants,
    validate_seat_scores, validate_sum, ValidationError,
};

use crate::models::{MatchRecord, MatchResult};

/// Build the ranked result view for a stored match.
///
/// Returns `None` if the record does not hold a complete table.
pub fn match_result(record: &MatchRecord, rules: &ScoringRules) -> Option<MatchResult> {
    let table = complete_match(&record.participants)?;
    Some(MatchResult {
        match_id: record.id,
        created_at: record.created_at,
        standings: rules.score_match(&table).to_vec(),
        total_score: record.total_score(),
    })
}
