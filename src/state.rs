use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::db;
use crate::notifier::TelegramNotifier;
use crate::rate_limit::RateLimiter;

// app's shared state
pub struct AppState {
    pub db: Option<MySqlPool>, // None when the store could not be set up at startup
    pub notifier: TelegramNotifier,
    pub rate_limiter: Arc<RateLimiter>, // guards POST /lead
}

impl AppState {
    pub fn new(
        db: Option<MySqlPool>,
        notifier: TelegramNotifier,
        rate_limiter: RateLimiter,
    ) -> Arc<Self> {
        Arc::new(Self {
            db,
            notifier,
            rate_limiter: Arc::new(rate_limiter),
        })
    }

    pub async fn from_args(args: &Args) -> anyhow::Result<Arc<Self>> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        // A missing store degrades the score routes instead of stopping the process
        let db = match db::init_store(&args.db_settings()).await {
            Ok(pool) => Some(pool),
            Err(e) => {
                error!("score store unavailable, score routes will answer 503: {e:#}");
                None
            }
        };

        let notifier = TelegramNotifier::new(
            http,
            &args.telegram_api_base,
            args.telegram_token(),
            args.telegram_chat_id(),
        );
        if !notifier.token_configured() || !notifier.chat_configured() {
            warn!(
                token = notifier.token_configured(),
                chat = notifier.chat_configured(),
                "telegram notifier is not fully configured"
            );
        }

        let rate_limiter = RateLimiter::new(args.lead_rate_max, args.rate_window());
        info!(
            max = args.lead_rate_max,
            window_ms = args.lead_rate_window_ms,
            "lead rate limit configured"
        );

        Ok(Self::new(db, notifier, rate_limiter))
    }
}
