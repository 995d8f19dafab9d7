/*
 * Responsibility
 * - POST /stations (admin のみ)
 * - GET /slots/{station_id} (public): station grid 上の空き slot
 */
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};

use crate::{
    api::v1::{
        dto::stations::{CreateStationRequest, StationResponse},
        extractors::{ApiJson, AuthCtxExtractor, public_id::PublicStationId},
    },
    error::AppError,
    repos::station_repo::StationRow,
    services::{
        auth::policy::{self, Action},
        slots,
    },
    state::AppState,
};

fn row_to_response(state: &AppState, row: StationRow) -> Result<StationResponse, AppError> {
    Ok(StationResponse {
        id: state.id_codec.encode(row.station_id)?,
        settings: row.settings().into(),
        name: row.name,
    })
}

pub async fn create_station(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    body: Result<ApiJson<CreateStationRequest>, AppError>,
) -> Result<(StatusCode, Json<StationResponse>), AppError> {
    policy::require_role(&ctx, Action::ManageStations)?;
    let ApiJson(req) = body?;
    req.validate().map_err(AppError::bad_request)?;

    let row = state
        .stations
        .create(req.name.trim(), req.settings.into())
        .await
        .map_err(AppError::store_failure("Failed to create station."))?;

    tracing::info!(station_id = row.station_id, user_id = %ctx.user_id, "station created");
    Ok((StatusCode::CREATED, Json(row_to_response(&state, row)?)))
}

pub async fn list_slots(
    State(state): State<AppState>,
    station_id: PublicStationId,
) -> Result<Json<Vec<DateTime<Utc>>>, AppError> {
    let station = state
        .stations
        .get(station_id.id)
        .await
        .map_err(AppError::store_failure("Failed to get available slots."))?
        .ok_or(AppError::not_found("Station"))?;

    let settings = station.settings();
    let now = Utc::now();
    let grid = slots::grid(settings, now);
    let (Some(first), Some(last)) = (grid.first().copied(), grid.last().copied()) else {
        return Ok(Json(Vec::new()));
    };

    let booked = state
        .bookings
        .booked_slots(station.station_id, first, last)
        .await
        .map_err(AppError::store_failure("Failed to get available slots."))?;

    Ok(Json(slots::available_slots(settings, &booked, now)))
}
