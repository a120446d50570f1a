use clap::Parser;
use std::time::Duration;

use crate::db::DbSettings;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Clone)]
#[command(name = "portfolio-backend")]
#[command(about = "Leaderboard and lead-capture API for the portfolio site")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    // MySQL connection parameters
    #[arg(long, env = "DB_HOST", default_value = "127.0.0.1")]
    pub db_host: String,

    #[arg(long, env = "DB_PORT", default_value_t = 3306)]
    pub db_port: u16,

    #[arg(long, env = "DB_USER", default_value = "root")]
    pub db_user: String,

    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    // Created at startup if missing
    #[arg(long, env = "DB_NAME", default_value = "portfolio")]
    pub db_name: String,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub db_max_connections: u32,

    // Telegram bot credentials for lead notifications
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    #[arg(long, env = "TELEGRAM_API_BASE", default_value = "https://api.telegram.org")]
    pub telegram_api_base: String,

    // Lead rate limit window in milliseconds
    #[arg(long, env = "LEAD_RATE_WINDOW_MS", default_value_t = 60_000)]
    pub lead_rate_window_ms: u64,

    // Lead rate limit max requests per window
    #[arg(long, env = "LEAD_RATE_MAX", default_value_t = 5)]
    pub lead_rate_max: u32,

    // How often expired rate limit buckets are dropped, 0 disables the sweeper
    #[arg(long, env = "LEAD_RATE_SWEEP_SECS", default_value_t = 300)]
    pub lead_rate_sweep_secs: u64,
}

impl Args {
    pub fn db_settings(&self) -> DbSettings {
        DbSettings {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
            max_connections: self.db_max_connections.clamp(1, 32),
        }
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.lead_rate_window_ms)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.lead_rate_sweep_secs > 0).then(|| Duration::from_secs(self.lead_rate_sweep_secs))
    }

    pub fn telegram_token(&self) -> Option<String> {
        non_blank(self.telegram_token.as_deref())
    }

    pub fn telegram_chat_id(&self) -> Option<String> {
        non_blank(self.telegram_chat_id.as_deref())
    }
}

// An env var set to "" should behave like an unset one
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
