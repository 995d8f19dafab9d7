use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::sync::OnceCell;

/// Lazily connected Postgres pool shared by the auth repos.
pub struct Database {
    url: String,
    max_connections: u32,
    pool: OnceCell<PgPool>,
}

impl Database {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            pool: OnceCell::new(),
        }
    }

    /// Idempotent; the first caller connects, everyone else reuses the pool.
    pub async fn ensure_connected(&self) -> Result<&PgPool, sqlx::Error> {
        self.pool
            .get_or_try_init(|| {
                PgPoolOptions::new()
                    .max_connections(self.max_connections)
                    .acquire_timeout(Duration::from_secs(5))
                    .connect(&self.url)
            })
            .await
    }
}
