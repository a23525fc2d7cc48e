//! Conversion from raw end-of-match scores to league points.

use serde::{Deserialize, Serialize};

use crate::models::{Participant, Placement, ScoredParticipant, PARTICIPANTS_PER_MATCH};

use super::rank::rank;

/// How raw scores become league points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointFormula {
    /// `(raw - starting_points) / scale + placement_bonus[placement]`.
    Uma {
        starting_points: i64,
        scale: f64,
        placement_bonus: [f64; 4],
    },
    /// Raw score passed through unchanged.
    RawScore,
}

impl Default for PointFormula {
    fn default() -> Self {
        PointFormula::Uma {
            starting_points: 25_000,
            scale: 1000.0,
            placement_bonus: [15.0, 5.0, -5.0, -15.0],
        }
    }
}

/// Scoring rules for a deployment: the required table total and the point formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub target_total: i64,
    pub formula: PointFormula,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            target_total: 100_000,
            formula: PointFormula::default(),
        }
    }
}

impl ScoringRules {
    /// Convert a raw score at the given placement into points.
    pub fn to_points(&self, raw_score: i64, placement: Placement) -> f64 {
        match &self.formula {
            PointFormula::Uma {
                starting_points,
                scale,
                placement_bonus,
            } => {
                (raw_score as f64 - *starting_points as f64) / scale
                    + placement_bonus[placement.index()]
            }
            PointFormula::RawScore => raw_score as f64,
        }
    }

    /// Rank a complete match and convert every participant's score.
    pub fn score_match(
        &self,
        participants: &[Participant; PARTICIPANTS_PER_MATCH],
    ) -> [ScoredParticipant; PARTICIPANTS_PER_MATCH] {
        rank(participants).map(|r| ScoredParticipant {
            player_id: r.participant.player_id,
            seat: r.participant.seat,
            score: r.participant.score,
            placement: r.placement,
            points: self.to_points(r.participant.score, r.placement),
        })
    }
}
