use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Lead;
use crate::validation::truncate;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier is not configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    Http(reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

// The bot token is part of the URL, keep it out of error messages
impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Http(e.without_url())
    }
}

// Telegram sendMessage request format
#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

// Telegram API response format
#[derive(Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
    result: Option<SentMessage>,
}

#[derive(Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Forwards leads to a Telegram chat through the Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    http: Client,
    api_base: String,
    token: Option<String>,
    default_chat: Option<String>,
}

impl TelegramNotifier {
    pub fn new(
        http: Client,
        api_base: &str,
        token: Option<String>,
        default_chat: Option<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            default_chat,
        }
    }

    pub fn token_configured(&self) -> bool {
        self.token.is_some()
    }

    pub fn chat_configured(&self) -> bool {
        self.default_chat.is_some()
    }

    // Per-request chat wins over the configured default
    pub fn resolve_chat(&self, requested: Option<&str>) -> Option<String> {
        requested
            .filter(|c| !c.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.default_chat.clone())
    }

    /// Sends one message and returns its Telegram `message_id`. Never retries.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<i64, NotifyError> {
        let token = self.token.as_deref().ok_or(NotifyError::NotConfigured)?;
        let url = format!("{}/bot{}/sendMessage", self.api_base, token);

        let res = self
            .http
            .post(&url)
            .json(&SendMessage {
                chat_id,
                text,
                disable_web_page_preview: true,
            })
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        let parsed: SendMessageResponse =
            serde_json::from_str(&body).map_err(|e| NotifyError::Malformed(e.to_string()))?;

        if !parsed.ok {
            return Err(NotifyError::Malformed(
                parsed.description.unwrap_or_else(|| "ok=false".to_string()),
            ));
        }

        parsed
            .result
            .map(|m| m.message_id)
            .ok_or_else(|| NotifyError::Malformed("missing result.message_id".to_string()))
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

pub fn format_lead_message(lead: &Lead, client_ip: &str) -> String {
    let options = lead.options.join(", ");

    format!(
        "New lead from the website\n\
         Name: {}\n\
         Phone: {}\n\
         Category: {}\n\
         Options: {}\n\
         Description: {}\n\
         IP: {}",
        lead.name,
        lead.phone,
        or_dash(&lead.category),
        or_dash(&options),
        or_dash(&lead.description),
        client_ip,
    )
}
