use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{MatchId, MatchResult, NewParticipant, SeatScore};

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub participants: Vec<NewParticipant>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMatchRequest {
    pub scores: Vec<SeatScore>,
}

#[derive(Debug, Serialize)]
pub struct DeleteMatchResponse {
    pub match_id: MatchId,
    pub rows_deleted: u64,
}

pub async fn create_match(
    State(state): State<AppState>,
    payload: Result<Json<CreateMatchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MatchResult>), ApiError> {
    let Json(request) = payload?;
    let match_id = state.ledger.create_match(&request.participants).await?;
    let result = state.ledger.match_result(match_id).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MatchResult>, ApiError> {
    let result = state.ledger.match_result(MatchId::new(id)).await?;
    Ok(Json(result))
}

pub async fn update_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateMatchRequest>, JsonRejection>,
) -> Result<Json<MatchResult>, ApiError> {
    let Json(request) = payload?;
    let match_id = MatchId::new(id);
    state.ledger.update_match(match_id, &request.scores).await?;
    let result = state.ledger.match_result(match_id).await?;
    Ok(Json(result))
}

/// Deleting an absent match succeeds with zero rows, so a repeated
/// confirm is harmless.
pub async fn delete_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteMatchResponse>, ApiError> {
    let match_id = MatchId::new(id);
    let rows_deleted = state.ledger.delete_match(match_id).await?;
    Ok(Json(DeleteMatchResponse {
        match_id,
        rows_deleted,
    }))
}
