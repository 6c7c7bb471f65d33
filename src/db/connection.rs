//! Database connection management

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    config::DatabaseConfig,
    constants::{DATABASE_RETRY_ATTEMPTS, DATABASE_RETRY_BASE_MS},
};

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
}

/// Create the connection pool, retrying with exponential backoff.
///
/// If the database is still unreachable after the retries, fall back to a
/// lazy pool so the service can boot and report unhealthy instead of
/// crash-looping; the pool reconnects on first successful acquire.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let mut delay = Duration::from_millis(DATABASE_RETRY_BASE_MS);

    for attempt in 1..=DATABASE_RETRY_ATTEMPTS {
        match pool_options(config).connect(&config.url).await {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < DATABASE_RETRY_ATTEMPTS => {
                tracing::warn!(attempt, "database not ready ({e}); retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => {
                tracing::warn!("database not ready after {attempt} attempts ({e}); connecting lazily");
            }
        }
    }

    pool_options(config).connect_lazy(&config.url)
}

/// Test database connection
pub async fn test_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
