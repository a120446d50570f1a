use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::db;
use crate::error::ApiError;
use crate::metrics::{REQUEST_TOTAL, SCORES_SAVED};
use crate::models::{CreatedResponse, ScoreEntry, TopScoresQuery};
use crate::state::AppState;
use crate::validation::{clamp_limit, parse_new_score};

pub async fn top_scores_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopScoresQuery>,
) -> Result<Json<Vec<ScoreEntry>>, ApiError> {
    REQUEST_TOTAL.inc();

    let pool = state.db.as_ref().ok_or(ApiError::StoreUnavailable)?;
    let limit = clamp_limit(query.limit.as_deref());

    let rows = db::top_scores(pool, limit).await?;

    Ok(Json(rows.into_iter().map(ScoreEntry::from).collect()))
}

pub async fn submit_score_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    REQUEST_TOTAL.inc();

    let Json(body) = body.map_err(|_| ApiError::InvalidBody)?;
    let score = parse_new_score(&body, chrono::Utc::now())?;

    let pool = state.db.as_ref().ok_or(ApiError::StoreUnavailable)?;
    let id = db::insert_score(pool, &score).await?;

    SCORES_SAVED.inc();
    info!(id, name = %score.name, score = score.score, "score saved");

    Ok((StatusCode::CREATED, Json(CreatedResponse { ok: true, id })))
}
