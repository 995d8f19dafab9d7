/*
 * Responsibility
 * - stations CRUD (作成 + id で取得)
 * - slot 設定は station の行に持つ
 */
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::repos::db::Database;
use crate::repos::error::{RepoError, RepoResult};

/// Slot grid of a station: `max_slots` slots, `duration_minutes` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationSettings {
    pub duration_minutes: i32,
    pub max_slots: i32,
}

impl Default for StationSettings {
    fn default() -> Self {
        Self {
            duration_minutes: 60,
            max_slots: 10,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StationRow {
    #[sqlx(rename = "stationId")]
    pub station_id: i64,

    pub name: String,

    #[sqlx(rename = "durationMinutes")]
    pub duration_minutes: i32,
    #[sqlx(rename = "maxSlots")]
    pub max_slots: i32,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl StationRow {
    pub fn settings(&self) -> StationSettings {
        StationSettings {
            duration_minutes: self.duration_minutes,
            max_slots: self.max_slots,
        }
    }
}

#[async_trait]
pub trait StationRepo: Send + Sync {
    async fn create(&self, name: &str, settings: StationSettings) -> RepoResult<StationRow>;

    async fn get(&self, station_id: i64) -> RepoResult<Option<StationRow>>;
}

#[derive(Debug, Clone)]
pub struct PgStationRepo {
    db: Arc<Database>,
}

impl PgStationRepo {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StationRepo for PgStationRepo {
    async fn create(&self, name: &str, settings: StationSettings) -> RepoResult<StationRow> {
        let pool = self.db.ensure_connected().await?;
        let row = sqlx::query_as::<_, StationRow>(
            r#"
            INSERT INTO stations (name, "durationMinutes", "maxSlots")
            VALUES ($1, $2, $3)
            RETURNING "stationId", name, "durationMinutes", "maxSlots", "createdAt"
            "#,
        )
        .bind(name)
        .bind(settings.duration_minutes)
        .bind(settings.max_slots)
        .fetch_one(pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get(&self, station_id: i64) -> RepoResult<Option<StationRow>> {
        let pool = self.db.ensure_connected().await?;
        let row = sqlx::query_as::<_, StationRow>(
            r#"
            SELECT "stationId", name, "durationMinutes", "maxSlots", "createdAt"
            FROM stations
            WHERE "stationId" = $1
            "#,
        )
        .bind(station_id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }
}
