use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::info;

/// Lazily-connected PostgreSQL handle.
///
/// The pool is created on first use. Concurrent first callers share one
/// connection attempt; a failed attempt leaves the cell empty so the next
/// call retries.
#[derive(Clone)]
pub struct Database {
    url: Arc<String>,
    pool: Arc<OnceCell<PgPool>>,
}

impl Database {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            url: Arc::new(database_url.into()),
            pool: Arc::new(OnceCell::new()),
        }
    }

    pub async fn pool(&self) -> Result<&PgPool> {
        self.pool
            .get_or_try_init(|| create_pool(&self.url))
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }
}

/// Creates a PostgreSQL connection pool and applies pending migrations.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}
