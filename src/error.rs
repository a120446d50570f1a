use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

use crate::notifier::NotifyError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request body must be a JSON object")]
    InvalidBody,

    #[error("name must be exactly 3 letters")]
    InvalidName,

    #[error("name is not allowed")]
    ForbiddenName,

    #[error("ship must be a non-empty string")]
    InvalidShip,

    #[error("score must be a non-negative number")]
    InvalidScore,

    #[error("name is required")]
    NameRequired,

    #[error("phone is required")]
    PhoneRequired,

    #[error("rate limit exceeded")]
    RateLimited { retry_after: Duration },

    #[error("score store is unavailable")]
    StoreUnavailable,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("notifier is not configured")]
    NotifierNotConfigured,

    #[error("notifier failed: {0}")]
    Notifier(NotifyError),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidBody => "invalid_body",
            ApiError::InvalidName => "invalid_name",
            ApiError::ForbiddenName => "forbidden_name",
            ApiError::InvalidShip => "invalid_ship",
            ApiError::InvalidScore => "invalid_score",
            ApiError::NameRequired => "name_required",
            ApiError::PhoneRequired => "phone_required",
            ApiError::RateLimited { .. } => "rate_limited",
            ApiError::StoreUnavailable => "db_unavailable",
            ApiError::Storage(_) => "db_error",
            ApiError::NotifierNotConfigured => "notifier_not_configured",
            ApiError::Notifier(_) => "notifier_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody
            | ApiError::InvalidName
            | ApiError::ForbiddenName
            | ApiError::InvalidShip
            | ApiError::InvalidScore
            | ApiError::NameRequired
            | ApiError::PhoneRequired => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Storage(_) | ApiError::NotifierNotConfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Notifier(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<NotifyError> for ApiError {
    fn from(e: NotifyError) -> Self {
        match e {
            NotifyError::NotConfigured => ApiError::NotifierNotConfigured,
            other => ApiError::Notifier(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal detail goes to the log only
        if status.is_server_error() {
            error!(code = self.code(), "{self}");
        }

        match &self {
            ApiError::RateLimited { retry_after } => {
                let retry_ms = u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX);
                let body = Json(json!({
                    "ok": false,
                    "error": self.code(),
                    "retryAfterMs": retry_ms,
                }));
                let mut response = (status, body).into_response();
                let secs = retry_ms.div_ceil(1000);
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(secs));
                response
            }
            // Listing clients render `items` unconditionally
            ApiError::StoreUnavailable => (
                status,
                Json(json!({ "ok": false, "error": self.code(), "items": [] })),
            )
                .into_response(),
            _ => (status, Json(json!({ "ok": false, "error": self.code() }))).into_response(),
        }
    }
}
