//! Placement ordering within a single match.

use std::cmp::Ordering;

use crate::models::{Participant, Placement, PARTICIPANTS_PER_MATCH};

/// A participant with its resolved placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked {
    pub placement: Placement,
    pub participant: Participant,
}

/// Higher raw score first; equal scores fall back to seat tie-break priority.
///
/// Seats are unique within a match, so this never returns `Equal` for two
/// different participants of the same match.
pub fn compare_for_rank(a: &Participant, b: &Participant) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.seat.tiebreak_priority().cmp(&b.seat.tiebreak_priority()))
}

/// Order the four participants of a match and assign placements 1..=4.
pub fn rank(participants: &[Participant; PARTICIPANTS_PER_MATCH]) -> [Ranked; PARTICIPANTS_PER_MATCH] {
    let mut sorted = *participants;
    sorted.sort_by(compare_for_rank);

    std::array::from_fn(|i| Ranked {
        placement: Placement::ALL[i],
        participant: sorted[i],
    })
}
