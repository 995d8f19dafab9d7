/*
 * Responsibility
 * - bookings CRUD
 * - BookingRepo::get は所有者チェック (認可) の基準になる取得
 * - (station, slot) ごとに `booked` は 1 件まで (partial unique index で保証)
 */
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::repos::db::Database;
use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::policy::Owned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Booked,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booked" => Ok(Self::Booked),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingRow {
    pub booking_id: i64,
    pub station_id: i64,
    pub user_id: Uuid,
    pub slot: DateTime<Utc>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for BookingRow {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

// status は TEXT カラム。取得後に BookingStatus へ parse
#[derive(Debug, FromRow)]
struct BookingRecord {
    #[sqlx(rename = "bookingId")]
    booking_id: i64,
    #[sqlx(rename = "stationId")]
    station_id: i64,
    #[sqlx(rename = "userId")]
    user_id: Uuid,
    slot: DateTime<Utc>,
    status: String,
    #[sqlx(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[sqlx(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRecord> for BookingRow {
    type Error = RepoError;

    fn try_from(r: BookingRecord) -> Result<Self, Self::Error> {
        let status = r
            .status
            .parse::<BookingStatus>()
            .map_err(|msg| RepoError::Db(sqlx::Error::Decode(msg.into())))?;

        Ok(Self {
            booking_id: r.booking_id,
            station_id: r.station_id,
            user_id: r.user_id,
            slot: r.slot,
            status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[async_trait]
pub trait BookingRepo: Send + Sync {
    /// `Conflict` when the slot already has a `booked` booking at this station.
    async fn create(
        &self,
        station_id: i64,
        user_id: Uuid,
        slot: DateTime<Utc>,
    ) -> RepoResult<BookingRow>;

    async fn get(&self, booking_id: i64) -> RepoResult<Option<BookingRow>>;

    /// Newest first. `owner = None` lists every booking.
    async fn list(&self, owner: Option<Uuid>, limit: i64) -> RepoResult<Vec<BookingRow>>;

    /// Slot times with a `booked` booking in `[from, to]`.
    async fn booked_slots(
        &self,
        station_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<DateTime<Utc>>>;

    async fn update_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> RepoResult<Option<BookingRow>>;
}

#[derive(Debug, Clone)]
pub struct PgBookingRepo {
    db: Arc<Database>,
}

impl PgBookingRepo {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookingRepo for PgBookingRepo {
    async fn create(
        &self,
        station_id: i64,
        user_id: Uuid,
        slot: DateTime<Utc>,
    ) -> RepoResult<BookingRow> {
        let pool = self.db.ensure_connected().await?;
        let rec = sqlx::query_as::<_, BookingRecord>(
            r#"
            INSERT INTO bookings ("stationId", "userId", slot, status)
            VALUES ($1, $2, $3, 'booked')
            RETURNING
                "bookingId", "stationId", "userId", slot, status, "createdAt", "updatedAt"
            "#,
        )
        .bind(station_id)
        .bind(user_id)
        .bind(slot)
        .fetch_one(pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        rec.try_into()
    }

    async fn get(&self, booking_id: i64) -> RepoResult<Option<BookingRow>> {
        let pool = self.db.ensure_connected().await?;
        let rec = sqlx::query_as::<_, BookingRecord>(
            r#"
            SELECT
                "bookingId", "stationId", "userId", slot, status, "createdAt", "updatedAt"
            FROM bookings
            WHERE "bookingId" = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(pool)
        .await?;

        rec.map(BookingRow::try_from).transpose()
    }

    async fn list(&self, owner: Option<Uuid>, limit: i64) -> RepoResult<Vec<BookingRow>> {
        let pool = self.db.ensure_connected().await?;
        let recs = sqlx::query_as::<_, BookingRecord>(
            r#"
            SELECT
                "bookingId", "stationId", "userId", slot, status, "createdAt", "updatedAt"
            FROM bookings
            WHERE ($1::uuid IS NULL OR "userId" = $1)
            ORDER BY "bookingId" DESC
            LIMIT $2
            "#,
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        recs.into_iter().map(BookingRow::try_from).collect()
    }

    async fn booked_slots(
        &self,
        station_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<DateTime<Utc>>> {
        let pool = self.db.ensure_connected().await?;
        let slots = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            SELECT slot
            FROM bookings
            WHERE "stationId" = $1
              AND status = 'booked'
              AND slot BETWEEN $2 AND $3
            "#,
        )
        .bind(station_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;

        Ok(slots)
    }

    async fn update_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> RepoResult<Option<BookingRow>> {
        let pool = self.db.ensure_connected().await?;
        let rec = sqlx::query_as::<_, BookingRecord>(
            r#"
            UPDATE bookings
            SET status = $2, "updatedAt" = now()
            WHERE "bookingId" = $1
            RETURNING
                "bookingId", "stationId", "userId", slot, status, "createdAt", "updatedAt"
            "#,
        )
        .bind(booking_id)
        .bind(status.as_str())
        .fetch_optional(pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        rec.map(BookingRow::try_from).transpose()
    }
}
