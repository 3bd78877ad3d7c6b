use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

use crate::{auth::jwt::JwtKeys, config::AppConfig};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::connect(config).await
    }

    /// Opens the pool described by `config.database_url`. Writers wait on
    /// each other for up to [`BUSY_TIMEOUT`] instead of failing with
    /// `SQLITE_BUSY`, and WAL keeps readers off the writer's lock.
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .context("parse DATABASE_URL")?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);
        let db = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .context("connect to database")?;
        Ok(Self::from_parts(db, Arc::new(config)))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        let keys = JwtKeys::from_config(&config.jwt);
        Self { db, config, keys }
    }

    /// A state backed by a private in-memory database with the schema
    /// already applied. The pool holds exactly one connection that never
    /// expires, since the database lives only as long as that connection.
    pub async fn in_memory(config: AppConfig) -> anyhow::Result<Self> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("open in-memory database")?;
        let state = Self::from_parts(db, Arc::new(config));
        state.migrate().await?;
        Ok(state)
    }

    /// Applies pending migrations. Safe to run on every startup.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        info!("database schema up to date");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let config = AppConfig::from_lookup(|key| (key == "JWT_SECRET").then(|| "test".to_string()))
        .expect("test config");
    AppState::in_memory(config).await.expect("in-memory state").db
}
