use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates the PostgreSQL connection pool.
///
/// The database is shared with the auth service, which owns the `users` and
/// `sessions` tables; this pool must be able to read them, so connectivity is
/// probed eagerly instead of on first request.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Database connectivity probe failed")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}
