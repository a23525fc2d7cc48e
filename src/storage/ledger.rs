//! The match ledger.
//!
//! Every mutation runs inside one transaction with an explicit commit, and
//! an explicit rollback on any error in the body. A transaction dropped
//! mid-flight (caller cancelled) is rolled back by the driver before the
//! connection goes back to the pool, so a match is never half written.
//!
//! Concurrent edits of the *same* match are not serialized here: SQLite's
//! write lock orders them and the last committed edit wins. Reads used for
//! the leaderboard do not take a snapshot across the whole scan.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info, warn};

use super::{connect, LedgerError};
use crate::calculate::{self, validate_participants, validate_seat_scores, ScoringRules};
use crate::config::DatabaseConfig;
use crate::models::{
    HistoryEntry, InvalidSeatCode, MatchId, MatchRecord, MatchResult, NewParticipant, Participant,
    PlayerId, Seat, SeatScore, Standing, PARTICIPANTS_PER_MATCH,
};

#[derive(Debug, sqlx::FromRow)]
struct DetailRow {
    match_id: i64,
    player_id: i64,
    score: i64,
    seat: i64,
}

impl DetailRow {
    fn into_participant(self) -> Result<Participant, InvalidSeatCode> {
        Ok(Participant {
            match_id: MatchId::new(self.match_id),
            player_id: PlayerId::new(self.player_id),
            score: self.score,
            seat: Seat::from_code(self.seat)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MatchRow {
    #[sqlx(flatten)]
    detail: DetailRow,
    created_at: DateTime<Utc>,
}

/// Service object over the match database. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct Ledger {
    pool: SqlitePool,
    rules: ScoringRules,
}

impl Ledger {
    pub fn new(pool: SqlitePool, rules: ScoringRules) -> Self {
        Self { pool, rules }
    }

    /// Connect a fresh pool and build a ledger over it.
    pub async fn open(config: &DatabaseConfig, rules: ScoringRules) -> Result<Self, LedgerError> {
        let pool = connect(config).await?;
        Ok(Self::new(pool, rules))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Record a new match and its four participants as one unit.
    pub async fn create_match(
        &self,
        participants: &[NewParticipant],
    ) -> Result<MatchId, LedgerError> {
        validate_participants(participants, self.rules.target_total)?;

        let mut tx = self.pool.begin().await?;
        let body = insert_match(&mut tx, participants, Utc::now()).await;
        let match_id = finish(tx, body, "create").await?;

        info!("Recorded match {}", match_id);
        Ok(match_id)
    }

    /// Load a complete match. Missing and partial matches are both `NotFound`.
    pub async fn get_match(&self, match_id: MatchId) -> Result<MatchRecord, LedgerError> {
        let rows: Vec<MatchRow> = sqlx::query_as(
            r#"SELECT d.match_id, d.player_id, d.score, d.seat, m.created_at
               FROM match_detail d
               JOIN "match" m ON m.id = d.match_id
               WHERE d.match_id = ?
               ORDER BY d.seat"#,
        )
        .bind(match_id.get())
        .fetch_all(&self.pool)
        .await?;

        if rows.len() != PARTICIPANTS_PER_MATCH {
            return Err(LedgerError::NotFound(match_id));
        }

        let created_at = rows[0].created_at;
        let participants = rows
            .into_iter()
            .map(|r| r.detail.into_participant())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(MatchRecord {
            id: match_id,
            created_at,
            participants,
        })
    }

    /// Load a match and rank it for display.
    pub async fn match_result(&self, match_id: MatchId) -> Result<MatchResult, LedgerError> {
        let record = self.get_match(match_id).await?;
        calculate::match_result(&record, &self.rules).ok_or(LedgerError::NotFound(match_id))
    }

    /// Replace the four raw scores of a match. Players and seats are unchanged.
    pub async fn update_match(
        &self,
        match_id: MatchId,
        scores: &[SeatScore],
    ) -> Result<(), LedgerError> {
        validate_seat_scores(scores, self.rules.target_total)?;

        let mut tx = self.pool.begin().await?;
        let body = apply_scores(&mut tx, match_id, scores).await;
        finish(tx, body, "update").await?;

        info!("Updated scores for match {}", match_id);
        Ok(())
    }

    /// Remove a match and its participants. Returns rows removed; zero when
    /// the match was already gone.
    pub async fn delete_match(&self, match_id: MatchId) -> Result<u64, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let body = remove_match(&mut tx, match_id).await;
        let removed = finish(tx, body, "delete").await?;

        if removed == 0 {
            debug!("Delete of match {} affected no rows", match_id);
        } else {
            info!("Deleted match {} ({} rows)", match_id, removed);
        }
        Ok(removed)
    }

    /// Lifetime standings over every complete match, best first.
    ///
    /// Recomputed from a full scan on each call.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<Standing>, LedgerError> {
        let rows: Vec<DetailRow> = sqlx::query_as(
            "SELECT match_id, player_id, score, seat FROM match_detail ORDER BY match_id, seat",
        )
        .fetch_all(&self.pool)
        .await?;
        debug!("Leaderboard scan read {} participant rows", rows.len());

        let participants = decode_rows(rows);
        let mut standings = calculate::aggregate(&participants, &self.rules);
        standings.truncate(limit.max(1));
        Ok(standings)
    }

    /// A player's most recent complete matches with recomputed placements.
    pub async fn player_history(
        &self,
        player_id: PlayerId,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, LedgerError> {
        let rows: Vec<DetailRow> = sqlx::query_as(
            r#"SELECT match_id, player_id, score, seat
               FROM match_detail
               WHERE match_id IN (SELECT match_id FROM match_detail WHERE player_id = ?)
               ORDER BY match_id, seat"#,
        )
        .bind(player_id.get())
        .fetch_all(&self.pool)
        .await?;

        let participants = decode_rows(rows);
        Ok(calculate::player_history(
            &participants,
            player_id,
            &self.rules,
            limit.max(1),
        ))
    }
}

/// Rows with an unknown seat code are dropped, which leaves their match
/// incomplete and excluded from scoring.
fn decode_rows(rows: Vec<DetailRow>) -> Vec<Participant> {
    rows.into_iter()
        .filter_map(|row| {
            let match_id = row.match_id;
            match row.into_participant() {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Dropping participant row of match #{}: {}", match_id, e);
                    None
                }
            }
        })
        .collect()
}

/// Commit on success; roll back and surface the body's error otherwise.
async fn finish<T>(
    tx: Transaction<'_, Sqlite>,
    body: Result<T, LedgerError>,
    operation: &str,
) -> Result<T, LedgerError> {
    match body {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            match tx.rollback().await {
                Ok(()) => warn!("Rolled back {}: {}", operation, e),
                Err(rb) => warn!("Rollback of {} failed: {} (after: {})", operation, rb, e),
            }
            Err(e)
        }
    }
}

async fn insert_match(
    conn: &mut SqliteConnection,
    participants: &[NewParticipant],
    created_at: DateTime<Utc>,
) -> Result<MatchId, LedgerError> {
    let header = sqlx::query(r#"INSERT INTO "match" (created_at) VALUES (?)"#)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;
    let match_id = MatchId::new(header.last_insert_rowid());

    for p in participants {
        sqlx::query(
            "INSERT INTO match_detail (match_id, player_id, score, seat) VALUES (?, ?, ?, ?)",
        )
        .bind(match_id.get())
        .bind(p.player_id.get())
        .bind(p.score)
        .bind(p.seat.code())
        .execute(&mut *conn)
        .await?;
    }

    Ok(match_id)
}

/// Seats are the primary key within a match, so four single-row updates
/// succeed exactly when the match holds a complete table.
async fn apply_scores(
    conn: &mut SqliteConnection,
    match_id: MatchId,
    scores: &[SeatScore],
) -> Result<(), LedgerError> {
    for s in scores {
        let updated = sqlx::query("UPDATE match_detail SET score = ? WHERE match_id = ? AND seat = ?")
            .bind(s.score)
            .bind(match_id.get())
            .bind(s.seat.code())
            .execute(&mut *conn)
            .await?;

        if updated.rows_affected() != 1 {
            return Err(LedgerError::NotFound(match_id));
        }
    }
    Ok(())
}

async fn remove_match(conn: &mut SqliteConnection, match_id: MatchId) -> Result<u64, LedgerError> {
    let details = sqlx::query("DELETE FROM match_detail WHERE match_id = ?")
        .bind(match_id.get())
        .execute(&mut *conn)
        .await?;
    let header = sqlx::query(r#"DELETE FROM "match" WHERE id = ?"#)
        .bind(match_id.get())
        .execute(&mut *conn)
        .await?;
    Ok(details.rows_affected() + header.rows_affected())
}
