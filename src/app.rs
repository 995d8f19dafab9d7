/*
 * Responsibility
 * - Config 読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (HTTP 制限/CORS/security header)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, StoreBackend};
use crate::middleware;
use crate::repos::booking_repo::PgBookingRepo;
use crate::repos::db::Database;
use crate::repos::notification_repo::PgNotificationRepo;
use crate::repos::station_repo::PgStationRepo;
use crate::services::auth::build_auth_service;
use crate::services::id_codec::IdCodec;
use crate::{api, state::AppState};

fn init_tracing() {
    // RUST_LOG があればそちらを優先 (例)
    // RUST_LOG=info,slotchain_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development では落とす。production は default hook のまま動かし続ける
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting booking API in {:?} mode on {} ({:?} store)",
        config.app_env,
        config.addr,
        config.store_backend
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)
        .context("building id codec")?;
    let auth = build_auth_service(config);

    let state = match config.store_backend {
        StoreBackend::Memory => AppState::in_memory(id_codec, auth),
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            // 必要になった最初の request で遅延接続
            let db = Arc::new(Database::new(url, config.database_max_connections));
            AppState::new(
                Arc::new(PgStationRepo::new(db.clone())),
                Arc::new(PgBookingRepo::new(db.clone())),
                Arc::new(PgNotificationRepo::new(db)),
                id_codec,
                auth,
            )
        }
    };

    Ok(state)
}

/// Routes only, no transport middleware (what the integration tests drive).
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state)
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = router(state);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, middleware::http::HttpLimits::from_config(config))
}
