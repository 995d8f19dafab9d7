mod common;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    routing::get,
};
use chrono::{DateTime, Utc};
use proptest::prelude::*;
use serde_json::json;
use slotchain_api::{
    api::v1::extractors::AuthCtxExtractor,
    middleware::auth::access::{self, GuardRejection},
    repos::{
        booking_repo::{BookingRepo, BookingRow, BookingStatus},
        error::RepoResult,
        memory::MemoryStore,
    },
    state::AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

use common::*;

/// BookingRepo that counts every call before delegating to the memory store.
struct CountingBookings {
    inner: Arc<MemoryStore>,
    calls: Arc<AtomicUsize>,
}

impl CountingBookings {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookingRepo for CountingBookings {
    async fn create(
        &self,
        station_id: i64,
        user_id: Uuid,
        slot: DateTime<Utc>,
    ) -> RepoResult<BookingRow> {
        self.hit();
        BookingRepo::create(self.inner.as_ref(), station_id, user_id, slot).await
    }

    async fn get(&self, booking_id: i64) -> RepoResult<Option<BookingRow>> {
        self.hit();
        BookingRepo::get(self.inner.as_ref(), booking_id).await
    }

    async fn list(&self, owner: Option<Uuid>, limit: i64) -> RepoResult<Vec<BookingRow>> {
        self.hit();
        self.inner.list(owner, limit).await
    }

    async fn booked_slots(
        &self,
        station_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<DateTime<Utc>>> {
        self.hit();
        self.inner.booked_slots(station_id, from, to).await
    }

    async fn update_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> RepoResult<Option<BookingRow>> {
        self.hit();
        self.inner.update_status(booking_id, status).await
    }
}

fn counting_state() -> (AppState, Arc<AtomicUsize>) {
    let store = Arc::new(MemoryStore::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let bookings = Arc::new(CountingBookings {
        inner: store.clone(),
        calls: calls.clone(),
    });
    let state = AppState::new(store.clone(), bookings, store, id_codec(), auth_service());
    (state, calls)
}

/// A single guarded route whose handler only counts invocations.
fn guarded_counter_app(state: AppState, hits: Arc<AtomicUsize>) -> Router {
    let protected = Router::new().route(
        "/guarded",
        get(move |AuthCtxExtractor(ctx): AuthCtxExtractor| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                ctx.user_id.to_string()
            }
        }),
    );
    access::apply(protected, state.clone()).with_state(state)
}

fn bearer(token: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    h
}

#[tokio::test]
async fn missing_header_never_reaches_the_handler() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = guarded_counter_app(memory_state(), hits.clone());

    let res = app
        .oneshot(request("GET", "/guarded", None, None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(res).await,
        json!({"error": "Unauthorized: No token provided"})
    );
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn valid_token_reaches_the_handler_with_its_subject() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = guarded_counter_app(memory_state(), hits.clone());
    let user = Uuid::new_v4();

    let res = app
        .oneshot(request("GET", "/guarded", Some(&token_for(user, "user")), None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes, user.to_string().as_bytes());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn forged_and_expired_tokens_never_reach_the_handler() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = guarded_counter_app(memory_state(), hits.clone());
    let user = Uuid::new_v4();

    let forged = sign(
        json!({"sub": user, "role": "admin", "exp": now() + 3600}),
        "someone-elses-secret",
    );
    for token in [forged, expired_token_for(user), "garbage".to_string()] {
        let (status, body) = send(&app, request("GET", "/guarded", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Invalid or expired token"}));
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_requests_do_no_resource_io() {
    let (state, calls) = counting_state();
    let app = app_with(state);
    let booking_id = id_codec().encode(1).unwrap();

    let expired = expired_token_for(Uuid::new_v4());
    for token in [None, Some(expired.as_str())] {
        let (status, _) = send(
            &app,
            request("GET", &format!("/api/v1/bookings/{booking_id}"), token, None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            request(
                "PATCH",
                &format!("/api/v1/bookings/{booking_id}/status"),
                token,
                Some(json!({"status": "cancelled"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn public_routes_skip_the_guard() {
    let app = app();

    let (status, body) = send(&app, request("GET", "/api/v1/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let unknown_station = id_codec().encode(404).unwrap();
    let (status, body) = send(
        &app,
        request("GET", &format!("/api/v1/slots/{unknown_station}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Station not found."}));
}

#[tokio::test]
async fn unknown_paths_are_not_found_rather_than_unauthorized() {
    let res = app()
        .oneshot(request("GET", "/api/v1/nope", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[test]
fn bearer_with_wrong_scheme_is_missing_not_invalid() {
    let auth = auth_service();
    let mut h = HeaderMap::new();
    h.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("Token abc.def.ghi"),
    );
    assert_eq!(
        access::authenticate(&auth, &h),
        Err(GuardRejection::MissingToken)
    );
}

proptest! {
    /// Property: authenticate(issue(sub)).user_id == sub, role carried through unchanged
    #[test]
    fn issued_token_round_trips_its_subject(
        raw in any::<u128>(),
        role in prop_oneof![Just("user".to_string()), Just("admin".to_string()), "[a-z]{1,10}"],
    ) {
        let sub = Uuid::from_u128(raw);
        let ctx = access::authenticate(&auth_service(), &bearer(&token_for(sub, &role))).unwrap();

        prop_assert_eq!(ctx.user_id, sub);
        prop_assert_eq!(ctx.role.as_deref(), Some(role.as_str()));
    }

    /// Property: any payload signed with another secret is rejected as invalid
    #[test]
    fn foreign_signature_is_always_rejected(
        raw in any::<u128>(),
        secret in "[a-zA-Z0-9]{8,32}",
        extra in "[a-z]{0,16}",
    ) {
        prop_assume!(secret != SECRET);
        let token = sign(
            json!({"sub": Uuid::from_u128(raw), "exp": now() + 3600, "note": extra}),
            &secret,
        );

        prop_assert_eq!(
            access::authenticate(&auth_service(), &bearer(&token)),
            Err(GuardRejection::InvalidToken)
        );
    }
}
