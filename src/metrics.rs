use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Histogram, TextEncoder, register_counter, register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("portfolio_requests_total", "Total number of API requests").unwrap();
    pub static ref SCORES_SAVED: Counter =
        register_counter!("portfolio_scores_saved_total", "Leaderboard rows inserted").unwrap();
    pub static ref LEADS_SENT: Counter =
        register_counter!("portfolio_leads_sent_total", "Leads forwarded to Telegram").unwrap();
    pub static ref LEADS_FAILED: Counter =
        register_counter!("portfolio_leads_failed_total", "Leads the notifier could not deliver").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("portfolio_rate_limited_total", "Lead requests rejected by the rate limiter").unwrap();
    pub static ref NOTIFY_LATENCY: Histogram = register_histogram!(
        "portfolio_notify_latency_seconds",
        "Telegram sendMessage latency in seconds"
    )
    .unwrap();
}

// Prometheus text exposition of the default registry
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
