//! Input validation for match submissions and edits.
//!
//! Everything here is pure. Callers run it before opening a transaction
//! and re-prompt on failure; nothing is retried.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{NewParticipant, PlayerId, Seat, SeatScore, PARTICIPANTS_PER_MATCH};

/// Rejected match input. Always recoverable by re-entering the scores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("scores sum to {actual}, expected {expected}")]
    SumMismatch { expected: i64, actual: i128 },

    #[error("expected {expected} participants, got {actual}")]
    WrongParticipantCount { expected: usize, actual: usize },

    #[error("seat {0} appears more than once")]
    DuplicateSeat(Seat),

    #[error("player {0} appears more than once")]
    DuplicatePlayer(PlayerId),

    #[error("score {0:?} is not an integer")]
    MalformedScore(String),

    #[error("unknown seat {0:?}")]
    MalformedSeat(String),

    #[error("malformed entry {0:?}")]
    MalformedEntry(String),
}

/// Check that the four raw scores add up to the configured total.
pub fn validate_sum(scores: &[i64], target_total: i64) -> Result<(), ValidationError> {
    if scores.len() != PARTICIPANTS_PER_MATCH {
        return Err(ValidationError::WrongParticipantCount {
            expected: PARTICIPANTS_PER_MATCH,
            actual: scores.len(),
        });
    }

    // Four i64 values cannot overflow an i128 sum
    let actual: i128 = scores.iter().map(|&s| i128::from(s)).sum();
    if actual != i128::from(target_total) {
        return Err(ValidationError::SumMismatch {
            expected: target_total,
            actual,
        });
    }

    Ok(())
}

/// Validate a full submission: count, unique seats, unique players, sum.
pub fn validate_participants(
    participants: &[NewParticipant],
    target_total: i64,
) -> Result<(), ValidationError> {
    check_count(participants.len())?;
    check_unique_seats(participants.iter().map(|p| p.seat))?;

    let mut players = HashSet::new();
    for p in participants {
        if !players.insert(p.player_id) {
            return Err(ValidationError::DuplicatePlayer(p.player_id));
        }
    }

    let scores: Vec<i64> = participants.iter().map(|p| p.score).collect();
    validate_sum(&scores, target_total)
}

/// Validate replacement scores for an edit: one per seat, correct sum.
pub fn validate_seat_scores(scores: &[SeatScore], target_total: i64) -> Result<(), ValidationError> {
    check_count(scores.len())?;
    check_unique_seats(scores.iter().map(|s| s.seat))?;

    let raw: Vec<i64> = scores.iter().map(|s| s.score).collect();
    validate_sum(&raw, target_total)
}

fn check_count(actual: usize) -> Result<(), ValidationError> {
    if actual != PARTICIPANTS_PER_MATCH {
        return Err(ValidationError::WrongParticipantCount {
            expected: PARTICIPANTS_PER_MATCH,
            actual,
        });
    }
    Ok(())
}

fn check_unique_seats(seats: impl Iterator<Item = Seat>) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for seat in seats {
        if !seen.insert(seat) {
            return Err(ValidationError::DuplicateSeat(seat));
        }
    }
    Ok(())
}

/// Parse raw score text as typed by a player.
pub fn parse_score(text: &str) -> Result<i64, ValidationError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::MalformedScore(text.to_string()))
}

pub fn parse_seat(text: &str) -> Result<Seat, ValidationError> {
    text.parse::<Seat>()
        .map_err(|_| ValidationError::MalformedSeat(text.to_string()))
}

/// Parse `SEAT:PLAYER:SCORE`, e.g. `east:1024:32000`.
pub fn parse_entry(text: &str) -> Result<NewParticipant, ValidationError> {
    let parts: Vec<&str> = text.split(':').collect();
    let [seat, player, score] = parts.as_slice() else {
        return Err(ValidationError::MalformedEntry(text.to_string()));
    };

    let player_id = player
        .parse::<PlayerId>()
        .map_err(|_| ValidationError::MalformedEntry(text.to_string()))?;

    Ok(NewParticipant::new(
        player_id,
        parse_seat(seat)?,
        parse_score(score)?,
    ))
}

/// Parse `SEAT:SCORE`, e.g. `south:-1200`.
pub fn parse_seat_score(text: &str) -> Result<SeatScore, ValidationError> {
    let Some((seat, score)) = text.split_once(':') else {
        return Err(ValidationError::MalformedEntry(text.to_string()));
    };
    Ok(SeatScore::new(parse_seat(seat)?, parse_score(score)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(player: i64, seat: Seat, score: i64) -> NewParticipant {
        NewParticipant::new(PlayerId::new(player), seat, score)
    }

    fn full_table() -> Vec<NewParticipant> {
        vec![
            entry(1, Seat::East, 35000),
            entry(2, Seat::South, 30000),
            entry(3, Seat::West, 20000),
            entry(4, Seat::North, 15000),
        ]
    }

    #[test]
    fn test_validate_sum_ok() {
        assert!(validate_sum(&[25000, 25000, 25000, 25000], 100000).is_ok());
        assert!(validate_sum(&[4000, 3000, 2000, 1000], 10000).is_ok());
    }

    #[test]
    fn test_validate_sum_mismatch() {
        assert_eq!(
            validate_sum(&[25000, 25000, 25000, 24000], 100000),
            Err(ValidationError::SumMismatch {
                expected: 100000,
                actual: 99000
            })
        );
    }

    #[test]
    fn test_validate_sum_negative_scores() {
        assert!(validate_sum(&[70000, 40000, -3000, -7000], 100000).is_ok());
    }

    #[test]
    fn test_validate_sum_does_not_wrap_or_clamp() {
        assert_eq!(
            validate_sum(&[i64::MAX, i64::MAX, -i64::MAX, 100000], 100000),
            Err(ValidationError::SumMismatch {
                expected: 100000,
                actual: i128::from(i64::MAX) + 100000,
            })
        );
        assert!(validate_sum(&[i64::MAX, -i64::MAX, 50000, 50000], 100000).is_ok());
    }

    #[test]
    fn test_validate_sum_wrong_count() {
        assert_eq!(
            validate_sum(&[50000, 50000], 100000),
            Err(ValidationError::WrongParticipantCount {
                expected: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn test_validate_participants_ok() {
        assert!(validate_participants(&full_table(), 100000).is_ok());
    }

    #[test]
    fn test_validate_participants_duplicate_seat() {
        let mut table = full_table();
        table[3].seat = Seat::East;
        assert_eq!(
            validate_participants(&table, 100000),
            Err(ValidationError::DuplicateSeat(Seat::East))
        );
    }

    #[test]
    fn test_validate_participants_duplicate_player() {
        let mut table = full_table();
        table[2].player_id = PlayerId::new(1);
        assert_eq!(
            validate_participants(&table, 100000),
            Err(ValidationError::DuplicatePlayer(PlayerId::new(1)))
        );
    }

    #[test]
    fn test_validate_participants_too_few() {
        let table = &full_table()[..3];
        assert!(matches!(
            validate_participants(table, 100000),
            Err(ValidationError::WrongParticipantCount { actual: 3, .. })
        ));
    }

    #[test]
    fn test_validate_seat_scores() {
        let scores = [
            SeatScore::new(Seat::North, 10000),
            SeatScore::new(Seat::West, 20000),
            SeatScore::new(Seat::South, 30000),
            SeatScore::new(Seat::East, 40000),
        ];
        assert!(validate_seat_scores(&scores, 100000).is_ok());
        assert!(matches!(
            validate_seat_scores(&scores, 10000),
            Err(ValidationError::SumMismatch { .. })
        ));
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(" 32000 "), Ok(32000));
        assert_eq!(parse_score("-1200"), Ok(-1200));
        assert_eq!(
            parse_score("32k"),
            Err(ValidationError::MalformedScore("32k".to_string()))
        );
        assert!(parse_score("").is_err());
    }

    #[test]
    fn test_parse_entry() {
        assert_eq!(
            parse_entry("west:77:18000"),
            Ok(entry(77, Seat::West, 18000))
        );
        assert!(matches!(
            parse_entry("west:77"),
            Err(ValidationError::MalformedEntry(_))
        ));
        assert!(matches!(
            parse_entry("middle:77:18000"),
            Err(ValidationError::MalformedSeat(_))
        ));
        assert!(matches!(
            parse_entry("west:77:lots"),
            Err(ValidationError::MalformedScore(_))
        ));
    }

    #[test]
    fn test_parse_seat_score() {
        assert_eq!(
            parse_seat_score("n:-500"),
            Ok(SeatScore::new(Seat::North, -500))
        );
        assert!(parse_seat_score("north").is_err());
    }
}
