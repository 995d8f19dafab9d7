//! 予約 API の resource server (stations / slots / bookings / notifications)
//! Bearer token の access guard 付き

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
