/*
 * Responsibility
 * - POST /book, GET /bookings, GET /bookings/{id}, PATCH /bookings/{id}/status
 * - 全 handler が access guard 配下で、AuthCtx を受け取る
 * - 単体 booking の route は先に load (404)、その後 所有者チェック (403)
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::bookings::{BookingResponse, CreateBookingRequest, UpdateBookingStatusRequest},
        extractors::{ApiJson, AuthCtxExtractor, public_id::PublicBookingId},
    },
    error::AppError,
    repos::{booking_repo::BookingRow, error::RepoError},
    services::{
        auth::policy::{self, Action},
        slots,
    },
    state::AppState,
};

const LIST_LIMIT: i64 = 100;

fn row_to_response(state: &AppState, row: BookingRow) -> Result<BookingResponse, AppError> {
    Ok(BookingResponse {
        id: state.id_codec.encode(row.booking_id)?,
        station_id: state.id_codec.encode(row.station_id)?,
        user_id: row.user_id,
        slot: row.slot,
        status: row.status.as_str(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub async fn create_booking(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    ApiJson(req): ApiJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let slot = req.validate().map_err(AppError::bad_request)?;
    let station_id = state.id_codec.decode(req.station_id.trim())?;

    let station = state
        .stations
        .get(station_id)
        .await
        .map_err(AppError::store_failure("Failed to create booking."))?
        .ok_or(AppError::not_found("Station"))?;

    let settings = station.settings();
    if !slots::is_on_grid(settings, slot) {
        return Err(AppError::bad_request(format!(
            "slot must start on the station's {}-minute grid",
            settings.duration_minutes
        )));
    }

    let row = match state.bookings.create(station.station_id, ctx.user_id, slot).await {
        Ok(row) => row,
        Err(RepoError::Conflict) => return Err(AppError::conflict("Slot already booked.")),
        Err(e) => return Err(AppError::store_failure("Failed to create booking.")(e)),
    };

    tracing::info!(
        booking_id = row.booking_id,
        station_id = row.station_id,
        user_id = %ctx.user_id,
        "booking created"
    );
    Ok((StatusCode::CREATED, Json(row_to_response(&state, row)?)))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    // admin は全件、それ以外は自分の booking だけ
    let owner = if policy::has_override(&ctx, Action::ListAllBookings) {
        None
    } else {
        Some(ctx.user_id)
    };

    let rows = state
        .bookings
        .list(owner, LIST_LIMIT)
        .await
        .map_err(AppError::store_failure("Failed to list bookings."))?;

    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(row_to_response(&state, row)?);
    }
    Ok(Json(res))
}

pub async fn get_booking(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    booking_id: PublicBookingId,
) -> Result<Json<BookingResponse>, AppError> {
    let row = policy::load_then_authorize(
        &ctx,
        Action::ReadBooking,
        "Booking",
        state.bookings.get(booking_id.id),
    )
    .await?;

    Ok(Json(row_to_response(&state, row)?))
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    booking_id: PublicBookingId,
    body: Result<ApiJson<UpdateBookingStatusRequest>, AppError>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = policy::load_then_authorize(
        &ctx,
        Action::UpdateBookingStatus,
        "Booking",
        state.bookings.get(booking_id.id),
    )
    .await?;

    // body は 404/403 の判定が済んでから評価する
    let ApiJson(req) = body?;
    let status = req.validate().map_err(AppError::bad_request)?;

    let row = match state.bookings.update_status(booking.booking_id, status).await {
        Ok(Some(row)) => row,
        // load と update の間に削除された
        Ok(None) => return Err(AppError::not_found("Booking")),
        Err(RepoError::Conflict) => return Err(AppError::conflict("Slot already booked.")),
        Err(e) => return Err(AppError::store_failure("Failed to update booking.")(e)),
    };

    tracing::info!(
        booking_id = row.booking_id,
        status = %row.status,
        user_id = %ctx.user_id,
        "booking status updated"
    );
    Ok(Json(row_to_response(&state, row)?))
}
