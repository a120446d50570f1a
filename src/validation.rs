//! Input normalization for the score and lead routes.
//!
//! Everything here is pure: handlers pass in the parsed JSON body (and the
//! current time where it matters) and get back a validated value or the
//! [`ApiError`] describing the first violated constraint.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{Lead, NewScore};

pub const NAME_LEN: usize = 3;

/// Three-letter tags rejected on the leaderboard, compared after normalization.
pub const BLOCKED_NAMES: &[&str] = &[
    "ASS", "CUM", "DIC", "DIK", "EBL", "EBU", "FAG", "FCK", "FUC", "FUK", "FUX", "HUI", "HUJ",
    "HUY", "JIZ", "KKK", "NAZ", "NGR", "NIG", "PIS", "PZD", "SEX", "SUX", "TIT", "VAG", "WTF",
    "XUI", "XUY", "XXX",
];

pub const MAX_SHIP_LEN: usize = 64;
pub const MAX_SCORE: f64 = 1e12;

pub const DEFAULT_TOP_LIMIT: u32 = 10;
pub const MIN_TOP_LIMIT: u32 = 1;
pub const MAX_TOP_LIMIT: u32 = 50;

pub const MAX_FIELD_LEN: usize = 500;
pub const MAX_OPTIONS: usize = 20;

const DB_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Uppercases, strips everything outside `A-Z`, then checks length and the blocklist.
pub fn normalize_name(raw: &str) -> Result<String, ApiError> {
    let name: String = raw
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_uppercase())
        .collect();

    if name.len() != NAME_LEN {
        return Err(ApiError::InvalidName);
    }
    if BLOCKED_NAMES.contains(&name.as_str()) {
        return Err(ApiError::ForbiddenName);
    }
    Ok(name)
}

pub fn validate_ship(raw: Option<&Value>) -> Result<String, ApiError> {
    let ship = raw
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::InvalidShip)?;
    Ok(truncate(ship, MAX_SHIP_LEN))
}

/// Accepts JSON numbers only; the fractional part is dropped.
pub fn validate_score(raw: Option<&Value>) -> Result<u64, ApiError> {
    let score = raw
        .and_then(Value::as_f64)
        .filter(|s| s.is_finite() && *s >= 0.0 && *s <= MAX_SCORE)
        .ok_or(ApiError::InvalidScore)?;
    Ok(score.trunc() as u64)
}

/// Resolves the optional client date into the stored UTC `DATETIME`.
/// Missing or unparseable values fall back to `now`.
pub fn resolve_date(raw: Option<&Value>, now: DateTime<Utc>) -> NaiveDateTime {
    let parsed = match raw {
        Some(Value::String(s)) => parse_date_str(s.trim()),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    };

    // MySQL DATETIME has no sub-second part in our schema
    let date = parsed.unwrap_or(now).naive_utc();
    date.with_nanosecond(0).unwrap_or(date)
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, DB_DATETIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn parse_new_score(body: &Value, now: DateTime<Utc>) -> Result<NewScore, ApiError> {
    let fields = body.as_object().ok_or(ApiError::InvalidBody)?;

    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .ok_or(ApiError::InvalidName)
        .and_then(normalize_name)?;
    let ship = validate_ship(fields.get("ship"))?;
    let score = validate_score(fields.get("score"))?;
    let date = resolve_date(fields.get("date"), now);

    Ok(NewScore {
        name,
        ship,
        score,
        date,
    })
}

/// Missing or unparseable limits use the default; everything else is clamped.
pub fn clamp_limit(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_TOP_LIMIT;
    };

    let parsed = raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f as i64)
    });

    match parsed {
        Some(n) => n.clamp(MIN_TOP_LIMIT as i64, MAX_TOP_LIMIT as i64) as u32,
        None => DEFAULT_TOP_LIMIT,
    }
}

/// Truncates to at most `max` characters without splitting a code point.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

fn text_field(fields: &serde_json::Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(|s| truncate(s.trim(), MAX_FIELD_LEN))
        .unwrap_or_default()
}

pub fn parse_lead(body: &Value) -> Result<Lead, ApiError> {
    let fields = body.as_object().ok_or(ApiError::InvalidBody)?;

    let name = text_field(fields, "name");
    if name.is_empty() {
        return Err(ApiError::NameRequired);
    }
    let phone = text_field(fields, "phone");
    if phone.is_empty() {
        return Err(ApiError::PhoneRequired);
    }

    let options = fields
        .get("options")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(MAX_OPTIONS)
                .map(|s| truncate(s, MAX_FIELD_LEN))
                .collect()
        })
        .unwrap_or_default();

    // Telegram chat ids are often sent as numbers
    let chat_id = match fields.get("chatId") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    Ok(Lead {
        name,
        phone,
        description: text_field(fields, "description"),
        category: text_field(fields, "category"),
        options,
        chat_id,
    })
}
