//! MySQL score store.
//!
//! [`init_store`] creates the database and the `scores` table if they are
//! missing. Queries take a generic sqlx `Executor`, so they can run against
//! the pool or a transaction.

use anyhow::{Context, bail};
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{ConnectOptions, Connection, Executor, MySql, MySqlPool};
use std::time::Duration;
use tracing::info;

use crate::models::{NewScore, ScoreRow};

const CREATE_SCORES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS scores (
    id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
    name CHAR(3) NOT NULL,
    ship VARCHAR(64) NOT NULL,
    score BIGINT UNSIGNED NOT NULL,
    date DATETIME NOT NULL,
    INDEX idx_scores_rank (score DESC, date ASC)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

#[derive(Clone)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl DbSettings {
    fn server_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
    }
}

// Database names go into DDL unquoted by the driver, so only allow plain identifiers
fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Connects, creates the database and schema if needed, and returns the pool.
pub async fn init_store(settings: &DbSettings) -> anyhow::Result<MySqlPool> {
    if !is_plain_identifier(&settings.database) {
        bail!("invalid database name {:?}", settings.database);
    }

    let server = settings.server_options();

    let mut conn = server
        .connect()
        .await
        .with_context(|| format!("connecting to MySQL at {}:{}", settings.host, settings.port))?;

    let create_db = format!(
        "CREATE DATABASE IF NOT EXISTS `{}` CHARACTER SET utf8mb4",
        settings.database
    );
    (&mut conn)
        .execute(create_db.as_str())
        .await
        .context("creating database")?;
    conn.close().await.ok();

    let pool = MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(server.database(&settings.database))
        .await
        .context("opening connection pool")?;

    ensure_schema(&pool).await?;

    info!(database = %settings.database, "score store ready");
    Ok(pool)
}

pub async fn ensure_schema(pool: &MySqlPool) -> anyhow::Result<()> {
    pool.execute(CREATE_SCORES_TABLE)
        .await
        .context("creating scores table")?;
    Ok(())
}

/// Inserts one score and returns its id.
pub async fn insert_score<'e, E>(executor: E, score: &NewScore) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = MySql>,
{
    let result = sqlx::query("INSERT INTO scores (name, ship, score, date) VALUES (?, ?, ?, ?)")
        .bind(&score.name)
        .bind(&score.ship)
        .bind(score.score)
        .bind(score.date)
        .execute(executor)
        .await?;

    Ok(result.last_insert_id())
}

/// Highest scores first; ties go to the earlier date, then the earlier insert.
pub async fn top_scores<'e, E>(executor: E, limit: u32) -> Result<Vec<ScoreRow>, sqlx::Error>
where
    E: Executor<'e, Database = MySql>,
{
    sqlx::query_as(
        r#"
        SELECT id, name, ship, score, date
        FROM scores
        ORDER BY score DESC, date ASC, id ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(executor)
    .await
}
