//! Leaderboard fold over the full participant history.
//!
//! Input rows must be sorted by match id so that a match's rows are
//! contiguous; grouping is then a single linear pass. Groups that are not
//! exactly four participants with distinct seats are skipped.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::models::{HistoryEntry, Participant, PlayerId, Standing, PARTICIPANTS_PER_MATCH};

use super::ScoringRules;

/// Split match-ordered rows into per-match groups.
pub fn group_by_match(rows: &[Participant]) -> impl Iterator<Item = &[Participant]> {
    rows.chunk_by(|a, b| a.match_id == b.match_id)
}

/// The group as a complete match, or `None` if it is incomplete or corrupt.
pub fn complete_match(group: &[Participant]) -> Option<[Participant; PARTICIPANTS_PER_MATCH]> {
    let table: [Participant; PARTICIPANTS_PER_MATCH] = group.try_into().ok()?;
    let seats: HashSet<_> = table.iter().map(|p| p.seat).collect();
    (seats.len() == PARTICIPANTS_PER_MATCH).then_some(table)
}

#[derive(Default)]
struct Tally {
    total: f64,
    count: u32,
}

/// Fold every complete match into per-player standings, best first.
pub fn aggregate(rows: &[Participant], rules: &ScoringRules) -> Vec<Standing> {
    let mut tallies: HashMap<PlayerId, Tally> = HashMap::new();

    for group in group_by_match(rows) {
        let Some(table) = complete_match(group) else {
            warn!(
                match_id = group[0].match_id.get(),
                rows = group.len(),
                "Skipping incomplete match"
            );
            continue;
        };

        for scored in rules.score_match(&table) {
            let tally = tallies.entry(scored.player_id).or_default();
            tally.total += scored.points;
            tally.count += 1;
        }
    }

    let mut standings: Vec<Standing> = tallies
        .into_iter()
        .map(|(player_id, t)| Standing {
            player_id,
            total_points: t.total,
            match_count: t.count,
        })
        .collect();

    standings.sort_by(compare_standings);
    standings
}

/// Average descending, then total descending, then player id ascending.
pub fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    b.average_points()
        .total_cmp(&a.average_points())
        .then_with(|| b.total_points.total_cmp(&a.total_points))
        .then_with(|| a.player_id.cmp(&b.player_id))
}

/// A player's complete matches, newest first, with placements recomputed.
pub fn player_history(
    rows: &[Participant],
    player_id: PlayerId,
    rules: &ScoringRules,
    limit: usize,
) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = group_by_match(rows)
        .filter_map(complete_match)
        .filter_map(|table| {
            rules
                .score_match(&table)
                .into_iter()
                .find(|s| s.player_id == player_id)
                .map(|s| HistoryEntry {
                    match_id: table[0].match_id,
                    score: s.score,
                    seat: s.seat,
                    placement: s.placement,
                    points: s.points,
                })
        })
        .collect();

    entries.sort_by(|a, b| b.match_id.cmp(&a.match_id));
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::PointFormula;
    use crate::models::{MatchId, Placement, Seat};
    use pretty_assertions::assert_eq;

    fn row(match_id: i64, player: i64, seat: Seat, score: i64) -> Participant {
        Participant {
            match_id: MatchId::new(match_id),
            player_id: PlayerId::new(player),
            score,
            seat,
        }
    }

    fn table(match_id: i64, entries: [(i64, Seat, i64); 4]) -> Vec<Participant> {
        entries
            .iter()
            .map(|&(player, seat, score)| row(match_id, player, seat, score))
            .collect()
    }

    #[test]
    fn test_group_by_match() {
        let mut rows = table(1, [
            (1, Seat::East, 25000),
            (2, Seat::South, 25000),
            (3, Seat::West, 25000),
            (4, Seat::North, 25000),
        ]);
        rows.push(row(2, 1, Seat::East, 100000));
        let groups: Vec<_> = group_by_match(&rows).map(|g| g.len()).collect();
        assert_eq!(groups, vec![4, 1]);
    }

    #[test]
    fn test_complete_match_rejects_duplicate_seats() {
        let rows = vec![
            row(1, 1, Seat::East, 25000),
            row(1, 2, Seat::East, 25000),
            row(1, 3, Seat::West, 25000),
            row(1, 4, Seat::North, 25000),
        ];
        assert!(complete_match(&rows).is_none());
    }

    #[test]
    fn test_aggregate_two_matches_and_skips_incomplete() {
        let rules = ScoringRules::default();
        let mut rows = table(1, [
            (1, Seat::East, 35000),
            (2, Seat::South, 30000),
            (3, Seat::West, 20000),
            (4, Seat::North, 15000),
        ]);
        rows.extend(table(2, [
            (1, Seat::East, 20000),
            (2, Seat::South, 40000),
            (3, Seat::West, 25000),
            (4, Seat::North, 15000),
        ]));
        // Corrupt match with only three rows
        rows.push(row(3, 1, Seat::East, 90000));
        rows.push(row(3, 2, Seat::South, 5000));
        rows.push(row(3, 3, Seat::West, 5000));

        let standings = aggregate(&rows, &rules);
        let player1 = standings
            .iter()
            .find(|s| s.player_id == PlayerId::new(1))
            .unwrap();

        // Match 1: 1st, (35000-25000)/1000 + 15 = 25
        // Match 2: 3rd, (20000-25000)/1000 - 5 = -10
        assert_eq!(player1.total_points, 15.0);
        assert_eq!(player1.match_count, 2);
        assert_eq!(standings.len(), 4);
    }

    #[test]
    fn test_aggregate_ordering() {
        let rules = ScoringRules::default();
        let rows = table(1, [
            (10, Seat::East, 45000),
            (20, Seat::South, 30000),
            (30, Seat::West, 15000),
            (40, Seat::North, 10000),
        ]);
        let order: Vec<i64> = aggregate(&rows, &rules)
            .iter()
            .map(|s| s.player_id.get())
            .collect();
        assert_eq!(order, vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_equal_average_ordered_by_total_then_player() {
        let a = Standing {
            player_id: PlayerId::new(5),
            total_points: 10.0,
            match_count: 1,
        };
        let b = Standing {
            player_id: PlayerId::new(2),
            total_points: 20.0,
            match_count: 2,
        };
        let c = Standing {
            player_id: PlayerId::new(1),
            total_points: 20.0,
            match_count: 2,
        };
        let mut standings = vec![a.clone(), b.clone(), c.clone()];
        standings.sort_by(compare_standings);
        assert_eq!(standings, vec![c, b, a]);
    }

    #[test]
    fn test_aggregate_raw_formula() {
        let rules = ScoringRules {
            target_total: 10_000,
            formula: PointFormula::RawScore,
        };
        let rows = table(1, [
            (1, Seat::East, 4000),
            (2, Seat::South, 3000),
            (3, Seat::West, 2000),
            (4, Seat::North, 1000),
        ]);
        let standings = aggregate(&rows, &rules);
        assert_eq!(standings[0].player_id, PlayerId::new(1));
        assert_eq!(standings[0].total_points, 4000.0);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[], &ScoringRules::default()).is_empty());
    }

    #[test]
    fn test_player_history_newest_first_with_limit() {
        let rules = ScoringRules::default();
        let mut rows = Vec::new();
        for match_id in 1..=3 {
            rows.extend(table(match_id, [
                (1, Seat::East, 30000),
                (2, Seat::South, 30000),
                (3, Seat::West, 20000),
                (4, Seat::North, 20000),
            ]));
        }

        let history = player_history(&rows, PlayerId::new(2), &rules, 2);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].match_id, MatchId::new(3));
        assert_eq!(history[1].match_id, MatchId::new(2));
        assert_eq!(history[0].placement, Placement::Second);
        assert_eq!(history[0].seat, Seat::South);
        assert_eq!(history[0].points, 10.0);
    }

    #[test]
    fn test_player_history_unknown_player() {
        let rows = table(1, [
            (1, Seat::East, 25000),
            (2, Seat::South, 25000),
            (3, Seat::West, 25000),
            (4, Seat::North, 25000),
        ]);
        assert!(player_history(&rows, PlayerId::new(99), &ScoringRules::default(), 10).is_empty());
    }
}
