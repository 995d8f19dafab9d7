/*
 * Responsibility
 * - Bookings の request/response DTO
 * - `slot` / `status` は文字列で受けて validate() で parse する
 *   (不正値もいつもの error body で 400 になる)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::booking_repo::BookingStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub station_id: String, // public id
    pub slot: String,       // RFC 3339
}

impl CreateBookingRequest {
    pub fn validate(&self) -> Result<DateTime<Utc>, &'static str> {
        if self.station_id.trim().is_empty() {
            return Err("stationId is required");
        }
        DateTime::parse_from_rfc3339(self.slot.trim())
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| "slot must be an RFC 3339 timestamp")
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

impl UpdateBookingStatusRequest {
    pub fn validate(&self) -> Result<BookingStatus, &'static str> {
        self.status
            .parse::<BookingStatus>()
            .map_err(|_| "status must be 'booked' or 'cancelled'")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,         // encoded
    pub station_id: String, // encoded
    pub user_id: Uuid,
    pub slot: DateTime<Utc>,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
