use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

use crate::config::AppConfig;

// Applied in order at connect. Every statement is idempotent
// (IF NOT EXISTS), so re-running on an existing database is a no-op.
const MIGRATIONS: &[(&str, &str)] = &[
    ("001_entities.sql", include_str!("../../migrations/001_entities.sql")),
    (
        "002_notifications.sql",
        include_str!("../../migrations/002_notifications.sql"),
    ),
];

#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(config.db_busy_timeout_ms));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout_seconds))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn migrate(&self) -> Result<()> {
        for (name, sql) in MIGRATIONS {
            sqlx::raw_sql(sql)
                .execute(&self.pool)
                .await
                .map_err(|err| anyhow::anyhow!("migration {} failed: {}", name, err))?;
        }
        Ok(())
    }
}
