use axum::{Json, extract::State};
use std::sync::Arc;

use crate::models::HealthResponse;
use crate::state::AppState;

// Liveness; `db` tells whether the score store came up
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        db: state.db.is_some(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
