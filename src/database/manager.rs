use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::StoreError;
use crate::config::DatabaseConfig;

/// Open the connection pool described by `config`.
///
/// Fails fast: the first connection is established before returning, so an
/// unreachable database is reported at startup rather than on first request.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(&config.url)
        .await?;

    info!(
        "Created database pool (max_connections={}, acquire_timeout={}s)",
        config.max_connections, config.connection_timeout
    );
    Ok(pool)
}

/// Bring the `todos` schema up to date.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrated");
    Ok(())
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Close the pool (e.g., on shutdown)
pub async fn close(pool: PgPool) {
    pool.close().await;
    info!("Closed database pool");
}
