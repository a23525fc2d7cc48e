//! Derived leaderboard and history models.

use serde::{Deserialize, Serialize};

use super::{MatchId, Placement, PlayerId, Seat};

/// A player's lifetime standing across all complete matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub player_id: PlayerId,
    pub total_points: f64,
    pub match_count: u32,
}

impl Standing {
    /// Average points per match.
    pub fn average_points(&self) -> f64 {
        if self.match_count == 0 {
            0.0
        } else {
            self.total_points / self.match_count as f64
        }
    }
}

/// One match in a player's history, with the placement recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub match_id: MatchId,
    pub score: i64,
    pub seat: Seat,
    pub placement: Placement,
    pub points: f64,
}
