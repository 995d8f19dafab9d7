use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::repos::db::Database;
use crate::repos::error::{RepoError, RepoResult};

pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub user_id: Uuid,
    pub email: String,
    #[sqlx(rename = "passwordHash")]
    pub password_hash: String,
    pub role: String,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// `Conflict` when the (normalised) email is taken.
    async fn create(&self, email: &str, password_hash: &str) -> RepoResult<UserRow>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>>;
}

pub struct PgUserRepo {
    db: Arc<Database>,
}

impl PgUserRepo {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create(&self, email: &str, password_hash: &str) -> RepoResult<UserRow> {
        let pool = self.db.ensure_connected().await?;
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, "passwordHash", role)
            VALUES ($1, $2, $3)
            RETURNING "userId", email, "passwordHash", role, "createdAt"
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(DEFAULT_ROLE)
        .fetch_one(pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        let pool = self.db.ensure_connected().await?;
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT "userId", email, "passwordHash", role, "createdAt"
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }
}
