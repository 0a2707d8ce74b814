use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::repository::RepositoryError;

/// Postgres pool construction and schema bootstrap
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, RepositoryError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| RepositoryError::ConnectionError("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;

        info!(max_connections = config.max_connections, "database pool ready");
        Ok(pool)
    }

    /// Create the dashboard tables if they are missing.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS categories (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                label TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS transactions (
                id UUID PRIMARY KEY,
                category TEXT NOT NULL,
                amount NUMERIC NOT NULL,
                kind TEXT NOT NULL,
                description TEXT,
                created_by UUID NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn health_check(pool: &PgPool) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
