//! Backend for the portfolio site: a small game leaderboard stored in MySQL
//! and a contact form that forwards leads to Telegram.
//!
//! Routes:
//! - `GET /health`
//! - `GET /scores/top?limit=N`, `POST /scores`
//! - `POST /lead` (rate limited per client IP), `GET /lead/ping`
//! - `GET /metrics`

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub mod client_ip;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod notifier;
pub mod rate_limit;
pub mod state;
pub mod validation;

use handlers::{
    health_handler, lead_handler, lead_ping_handler, metrics_handler, submit_score_handler,
    top_scores_handler,
};
use state::AppState;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    // The site is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_handler))
        .route("/scores/top", get(top_scores_handler))
        .route("/scores", post(submit_score_handler))
        .route("/lead", post(lead_handler))
        .route("/lead/ping", get(lead_ping_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}
