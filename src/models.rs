use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// A leaderboard row as stored in MySQL
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoreRow {
    pub id: u64,
    pub name: String,
    pub ship: String,
    pub score: u64,
    pub date: NaiveDateTime,
}

// Leaderboard row as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreEntry {
    pub id: u64,
    pub name: String,
    pub ship: String,
    pub score: u64,
    pub date: DateTime<Utc>,
}

impl From<ScoreRow> for ScoreEntry {
    fn from(row: ScoreRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            ship: row.ship,
            score: row.score,
            date: row.date.and_utc(),
        }
    }
}

// Validated score ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
    pub name: String,
    pub ship: String,
    pub score: u64,
    pub date: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct TopScoresQuery {
    pub limit: Option<String>,
}

// Validated contact form submission, never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub name: String,
    pub phone: String,
    pub description: String,
    pub category: String,
    pub options: Vec<String>,
    pub chat_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub ok: bool,
    pub id: u64,
}

#[derive(Debug, Serialize)]
pub struct LeadResponse {
    pub ok: bool,
    #[serde(rename = "messageId")]
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub db: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub ok: bool,
    #[serde(rename = "tokenConfigured")]
    pub token_configured: bool,
    #[serde(rename = "chatConfigured")]
    pub chat_configured: bool,
}
