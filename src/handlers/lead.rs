use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::client_ip::ClientIp;
use crate::error::ApiError;
use crate::metrics::{LEADS_FAILED, LEADS_SENT, NOTIFY_LATENCY, RATE_LIMITED, REQUEST_TOTAL};
use crate::models::{LeadResponse, PingResponse};
use crate::notifier::format_lead_message;
use crate::rate_limit::Decision;
use crate::state::AppState;
use crate::validation::parse_lead;

pub async fn lead_handler(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LeadResponse>, ApiError> {
    REQUEST_TOTAL.inc();

    // Rate limit first, malformed bodies still count
    if let Decision::Limited { retry_after } = state.rate_limiter.check(&ip) {
        RATE_LIMITED.inc();
        warn!(%ip, "lead rate limit exceeded");
        return Err(ApiError::RateLimited { retry_after });
    }

    let Json(body) = body.map_err(|_| ApiError::InvalidBody)?;
    let lead = parse_lead(&body)?;

    let chat_id = state
        .notifier
        .resolve_chat(lead.chat_id.as_deref())
        .ok_or(ApiError::NotifierNotConfigured)?;

    let text = format_lead_message(&lead, &ip);

    let timer = NOTIFY_LATENCY.start_timer();
    let result = state.notifier.send_message(&chat_id, &text).await;
    timer.observe_duration();

    match result {
        Ok(message_id) => {
            LEADS_SENT.inc();
            info!(message_id, %ip, "lead forwarded");
            Ok(Json(LeadResponse {
                ok: true,
                message_id,
            }))
        }
        Err(e) => {
            LEADS_FAILED.inc();
            Err(e.into())
        }
    }
}

// Configuration check only, never calls Telegram
pub async fn lead_ping_handler(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    let token_configured = state.notifier.token_configured();
    let chat_configured = state.notifier.chat_configured();

    Json(PingResponse {
        ok: token_configured && chat_configured,
        token_configured,
        chat_configured,
    })
}
