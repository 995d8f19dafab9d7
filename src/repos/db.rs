/*
 * Responsibility
 * - プロセス共通の Postgres handle (初回利用時に遅延接続)
 * - ensure_connected() は冪等、毎 request から呼んでよい
 */
use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::sync::OnceCell;

pub struct Database {
    url: String,
    max_connections: u32,
    pool: OnceCell<PgPool>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // the url carries credentials
        f.debug_struct("Database")
            .field("max_connections", &self.max_connections)
            .field("connected", &self.pool.initialized())
            .finish()
    }
}

impl Database {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            pool: OnceCell::new(),
        }
    }

    /// Returns the pool, connecting first if no connection was made yet.
    ///
    /// Concurrent first callers wait on the same connection attempt. A failed
    /// attempt leaves the cell empty so the next request tries again.
    pub async fn ensure_connected(&self) -> Result<&PgPool, sqlx::Error> {
        self.pool
            .get_or_try_init(|| async {
                tracing::info!(max_connections = self.max_connections, "connecting to postgres");
                PgPoolOptions::new()
                    .max_connections(self.max_connections)
                    .acquire_timeout(Duration::from_secs(5))
                    .connect(&self.url)
                    .await
            })
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }
}
