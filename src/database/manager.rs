use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Lazily-initialized singleton connection pool.
///
/// The pool is created on first access (nothing connects at startup) and
/// closed explicitly from the shutdown path.
pub struct Database {
    pool: RwLock<Option<PgPool>>,
}

impl Database {
    fn instance() -> &'static Database {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<Database> = OnceLock::new();
        INSTANCE.get_or_init(|| Database {
            pool: RwLock::new(None),
        })
    }

    /// Get the shared pool, connecting on first use
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let this = Self::instance();

        // Fast path: already connected
        {
            let pool = this.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let cfg = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.connection_timeout_secs))
            .connect(&url)
            .await?;

        let mut guard = this.pool.write().await;
        if let Some(existing) = guard.as_ref() {
            // Another task connected while we were; keep the first pool
            let existing = existing.clone();
            drop(guard);
            pool.close().await;
            return Ok(existing);
        }
        *guard = Some(pool.clone());

        info!("Connected database pool");
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool on shutdown
    pub async fn close() {
        let this = Self::instance();
        let pool = this.pool.write().await.take();
        if let Some(pool) = pool {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
