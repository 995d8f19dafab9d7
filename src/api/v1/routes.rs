/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - public な route (/health, /slots/{station_id}) と guard 付き route を merge
 * - `protected` 配下はすべて access guard を通す
 */
use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::api::v1::handlers::{
    bookings::{create_booking, get_booking, list_bookings, update_booking_status},
    health::health,
    notifications::{list_notifications, notify},
    stations::{create_station, list_slots},
};
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/slots/{station_id}", get(list_slots));

    let protected = Router::new()
        .route("/stations", post(create_station))
        .route("/book", post(create_booking))
        .route("/bookings", get(list_bookings))
        .route("/bookings/{booking_id}", get(get_booking))
        .route("/bookings/{booking_id}/status", patch(update_booking_status))
        .route("/notifications", get(list_notifications))
        .route("/notify", post(notify));

    public.merge(access::apply(protected, state))
}
