use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{clamp_limit, ApiError};
use crate::models::{HistoryEntry, PlayerId};

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player_id: PlayerId,
    pub total_points: f64,
    pub match_count: u32,
    pub average_points: f64,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub standings: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub player_id: PlayerId,
    pub matches: Vec<HistoryEntry>,
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let standings = state.ledger.leaderboard(clamp_limit(params.limit)).await?;

    let standings = standings
        .into_iter()
        .enumerate()
        .map(|(i, s)| LeaderboardEntry {
            rank: i + 1,
            player_id: s.player_id,
            average_points: s.average_points(),
            total_points: s.total_points,
            match_count: s.match_count,
        })
        .collect();

    Ok(Json(LeaderboardResponse { standings }))
}

pub async fn player_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<LimitParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let player_id = PlayerId::new(id);
    let matches = state
        .ledger
        .player_history(player_id, clamp_limit(params.limit))
        .await?;

    Ok(Json(HistoryResponse { player_id, matches }))
}
