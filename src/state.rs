/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - repo は trait object (Postgres / in-memory を差し替え可能)
 * - Clone 前提で持つ (内部は Arc で cheap)
 */
use std::sync::Arc;

use crate::repos::booking_repo::BookingRepo;
use crate::repos::memory::MemoryStore;
use crate::repos::notification_repo::NotificationRepo;
use crate::repos::station_repo::StationRepo;
use crate::services::{auth::AuthService, id_codec::IdCodec};

#[derive(Clone)]
pub struct AppState {
    pub stations: Arc<dyn StationRepo>,
    pub bookings: Arc<dyn BookingRepo>,
    pub notifications: Arc<dyn NotificationRepo>,
    pub id_codec: IdCodec,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        stations: Arc<dyn StationRepo>,
        bookings: Arc<dyn BookingRepo>,
        notifications: Arc<dyn NotificationRepo>,
        id_codec: IdCodec,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            stations,
            bookings,
            notifications,
            id_codec,
            auth,
        }
    }

    /// Every repo backed by one shared `MemoryStore`.
    pub fn in_memory(id_codec: IdCodec, auth: Arc<AuthService>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store.clone(), store, id_codec, auth)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("id_codec", &self.id_codec)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
