use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::DB_TIMEOUT;

/// Shared process state: the pool is assigned once at startup and shared
/// read-only for the process lifetime. No component holds its own
/// connection.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = pool_options(&config)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db, config })
    }

    /// State with a lazy pool that never connects unless a query runs. Lets
    /// tests exercise paths that must short-circuit before the store.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig::for_tests());
        let db = pool_options(&config)
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        Self { db, config }
    }
}

fn pool_options(config: &AppConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.pool.max_connections)
        .idle_timeout(Duration::from_secs(config.pool.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.pool.max_lifetime_secs))
        .acquire_timeout(DB_TIMEOUT)
}
