/*
 * Responsibility
 * - 全 repo trait の in-process 実装 (STORE_BACKEND=memory、tests 用)
 * - 外から見える挙動は Postgres 版と揃える (id 採番 / 並び順 / slot の一意性)
 */
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::booking_repo::{BookingRepo, BookingRow, BookingStatus};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::notification_repo::{NotificationRepo, NotificationRow};
use crate::repos::station_repo::{StationRepo, StationRow, StationSettings};

#[derive(Debug, Default)]
struct Tables {
    last_id: i64,
    stations: BTreeMap<i64, StationRow>,
    bookings: BTreeMap<i64, BookingRow>,
    notifications: BTreeMap<i64, NotificationRow>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn slot_taken(&self, station_id: i64, slot: DateTime<Utc>, except: Option<i64>) -> bool {
        self.bookings.values().any(|b| {
            b.station_id == station_id
                && b.slot == slot
                && b.status == BookingStatus::Booked
                && Some(b.booking_id) != except
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StationRepo for MemoryStore {
    async fn create(&self, name: &str, settings: StationSettings) -> RepoResult<StationRow> {
        let mut t = self.tables.write().await;
        let station_id = t.next_id();
        let row = StationRow {
            station_id,
            name: name.to_string(),
            duration_minutes: settings.duration_minutes,
            max_slots: settings.max_slots,
            created_at: Utc::now(),
        };
        t.stations.insert(station_id, row.clone());
        Ok(row)
    }

    async fn get(&self, station_id: i64) -> RepoResult<Option<StationRow>> {
        Ok(self.tables.read().await.stations.get(&station_id).cloned())
    }
}

#[async_trait]
impl BookingRepo for MemoryStore {
    async fn create(
        &self,
        station_id: i64,
        user_id: Uuid,
        slot: DateTime<Utc>,
    ) -> RepoResult<BookingRow> {
        let mut t = self.tables.write().await;
        if t.slot_taken(station_id, slot, None) {
            return Err(RepoError::Conflict);
        }

        let now = Utc::now();
        let booking_id = t.next_id();
        let row = BookingRow {
            booking_id,
            station_id,
            user_id,
            slot,
            status: BookingStatus::Booked,
            created_at: now,
            updated_at: now,
        };
        t.bookings.insert(booking_id, row.clone());
        Ok(row)
    }

    async fn get(&self, booking_id: i64) -> RepoResult<Option<BookingRow>> {
        Ok(self.tables.read().await.bookings.get(&booking_id).cloned())
    }

    async fn list(&self, owner: Option<Uuid>, limit: i64) -> RepoResult<Vec<BookingRow>> {
        let t = self.tables.read().await;
        let rows = t
            .bookings
            .values()
            .rev()
            .filter(|b| owner.is_none_or(|o| b.user_id == o))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn booked_slots(
        &self,
        station_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<DateTime<Utc>>> {
        let t = self.tables.read().await;
        let slots = t
            .bookings
            .values()
            .filter(|b| {
                b.station_id == station_id
                    && b.status == BookingStatus::Booked
                    && b.slot >= from
                    && b.slot <= to
            })
            .map(|b| b.slot)
            .collect();
        Ok(slots)
    }

    async fn update_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> RepoResult<Option<BookingRow>> {
        let mut t = self.tables.write().await;
        let Some((station_id, slot)) = t.bookings.get(&booking_id).map(|b| (b.station_id, b.slot))
        else {
            return Ok(None);
        };

        if status == BookingStatus::Booked && t.slot_taken(station_id, slot, Some(booking_id)) {
            return Err(RepoError::Conflict);
        }

        let row = t.bookings.get_mut(&booking_id).map(|b| {
            b.status = status;
            b.updated_at = Utc::now();
            b.clone()
        });
        Ok(row)
    }
}

#[async_trait]
impl NotificationRepo for MemoryStore {
    async fn create(&self, user_id: Uuid, message: &str) -> RepoResult<NotificationRow> {
        let mut t = self.tables.write().await;
        let notification_id = t.next_id();
        let row = NotificationRow {
            notification_id,
            user_id,
            message: message.to_string(),
            created_at: Utc::now(),
        };
        t.notifications.insert(notification_id, row.clone());
        Ok(row)
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> RepoResult<Vec<NotificationRow>> {
        let t = self.tables.read().await;
        let rows = t
            .notifications
            .values()
            .rev()
            .filter(|n| n.user_id == user_id)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect();
        Ok(rows)
    }
}
