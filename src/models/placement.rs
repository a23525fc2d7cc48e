//! Match participants and their placements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MatchId, PlayerId, Seat};

/// Number of participants in every match.
pub const PARTICIPANTS_PER_MATCH: usize = 4;

/// Finishing position within a match (1 = winner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Placement {
    First,
    Second,
    Third,
    Fourth,
}

impl Placement {
    pub const ALL: [Placement; 4] = [
        Placement::First,
        Placement::Second,
        Placement::Third,
        Placement::Fourth,
    ];

    /// Placement for a zero-based position in a ranked list.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Zero-based position, also the index into the placement bonus table.
    pub fn index(self) -> usize {
        match self {
            Placement::First => 0,
            Placement::Second => 1,
            Placement::Third => 2,
            Placement::Fourth => 3,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl From<Placement> for u8 {
    fn from(p: Placement) -> Self {
        p.number()
    }
}

impl TryFrom<u8> for Placement {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        usize::from(n)
            .checked_sub(1)
            .and_then(Self::from_index)
            .ok_or_else(|| format!("placement must be 1..=4, got {}", n))
    }
}

/// A (player, score, seat) triple supplied by the caller for a new match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipant {
    pub player_id: PlayerId,
    pub seat: Seat,
    pub score: i64,
}

impl NewParticipant {
    pub fn new(player_id: PlayerId, seat: Seat, score: i64) -> Self {
        Self {
            player_id,
            seat,
            score,
        }
    }
}

/// A new raw score for one seat of an existing match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatScore {
    pub seat: Seat,
    pub score: i64,
}

impl SeatScore {
    pub fn new(seat: Seat, score: i64) -> Self {
        Self { seat, score }
    }
}

/// A stored participant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub score: i64,
    pub seat: Seat,
}

/// A complete match: header plus its four participants in seat storage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
}

impl MatchRecord {
    /// Widened so a table with extreme scores cannot overflow mid-sum.
    pub fn total_score(&self) -> i128 {
        self.participants.iter().map(|p| i128::from(p.score)).sum()
    }
}

/// A participant annotated with placement and converted points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredParticipant {
    pub player_id: PlayerId,
    pub seat: Seat,
    pub score: i64,
    pub placement: Placement,
    pub points: f64,
}

/// Ranked view of one match, as shown back after create and edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub created_at: DateTime<Utc>,
    /// Participants ordered by placement.
    pub standings: Vec<ScoredParticipant>,
    pub total_score: i128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_index_and_number() {
        assert_eq!(Placement::from_index(0), Some(Placement::First));
        assert_eq!(Placement::from_index(3), Some(Placement::Fourth));
        assert_eq!(Placement::from_index(4), None);
        assert_eq!(Placement::Third.number(), 3);
        assert_eq!(Placement::try_from(4), Ok(Placement::Fourth));
        assert!(Placement::try_from(0).is_err());
        assert!(Placement::try_from(5).is_err());
    }

    #[test]
    fn test_placement_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Placement::Second).unwrap(), "2");
        let p: Placement = serde_json::from_str("4").unwrap();
        assert_eq!(p, Placement::Fourth);
        assert!(serde_json::from_str::<Placement>("5").is_err());
    }

    fn row(match_id: MatchId, player: i64, score: i64, seat: Seat) -> Participant {
        Participant {
            match_id,
            player_id: PlayerId::new(player),
            score,
            seat,
        }
    }

    #[test]
    fn test_match_record_total() {
        let id = MatchId::new(1);
        let record = MatchRecord {
            id,
            created_at: Utc::now(),
            participants: vec![
                row(id, 1, 40000, Seat::East),
                row(id, 2, 30000, Seat::West),
                row(id, 3, 20000, Seat::South),
                row(id, 4, 10000, Seat::North),
            ],
        };
        assert_eq!(record.total_score(), 100000);
    }

    #[test]
    fn test_new_participant_deserialize() {
        let json = r#"{"player_id": 11, "seat": "north", "score": -1200}"#;
        let p: NewParticipant = serde_json::from_str(json).unwrap();
        assert_eq!(p, NewParticipant::new(PlayerId::new(11), Seat::North, -1200));
    }
}
