/*
 * Responsibility
 * - user ごとの notifications (作成 + 一覧)
 */
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::repos::db::Database;
use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    #[sqlx(rename = "notificationId")]
    pub notification_id: i64,

    #[sqlx(rename = "userId")]
    pub user_id: Uuid,

    pub message: String,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait NotificationRepo: Send + Sync {
    async fn create(&self, user_id: Uuid, message: &str) -> RepoResult<NotificationRow>;

    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> RepoResult<Vec<NotificationRow>>;
}

#[derive(Debug, Clone)]
pub struct PgNotificationRepo {
    db: Arc<Database>,
}

impl PgNotificationRepo {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepo for PgNotificationRepo {
    async fn create(&self, user_id: Uuid, message: &str) -> RepoResult<NotificationRow> {
        let pool = self.db.ensure_connected().await?;
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications ("userId", message)
            VALUES ($1, $2)
            RETURNING "notificationId", "userId", message, "createdAt"
            "#,
        )
        .bind(user_id)
        .bind(message)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> RepoResult<Vec<NotificationRow>> {
        let pool = self.db.ensure_connected().await?;
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT "notificationId", "userId", message, "createdAt"
            FROM notifications
            WHERE "userId" = $1
            ORDER BY "notificationId" DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}
