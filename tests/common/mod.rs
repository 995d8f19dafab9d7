#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use slotchain_api::{
    app,
    services::{auth::AuthService, id_codec::IdCodec},
    state::AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";
const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn id_codec() -> IdCodec {
    IdCodec::new(10, ALPHABET).unwrap()
}

pub fn auth_service() -> Arc<AuthService> {
    Arc::new(AuthService::new(SECRET, 0))
}

pub fn memory_state() -> AppState {
    AppState::in_memory(id_codec(), auth_service())
}

pub fn app_with(state: AppState) -> Router {
    app::router(state)
}

pub fn app() -> Router {
    app_with(memory_state())
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn sign(claims: Value, secret: &str) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Token the auth service would issue for `sub`.
pub fn token_for(sub: Uuid, role: &str) -> String {
    sign(
        json!({
            "sub": sub,
            "email": format!("{sub}@example.com"),
            "role": role,
            "iat": now(),
            "exp": now() + 3600,
        }),
        SECRET,
    )
}

pub fn expired_token_for(sub: Uuid) -> String {
    sign(
        json!({"sub": sub, "role": "user", "iat": now() - 7200, "exp": now() - 3600}),
        SECRET,
    )
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Like `request`, but sends `body` verbatim as application/json.
pub fn raw_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn json_body(res: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    (status, json_body(res).await)
}

/// Creates a station as an admin and returns its public id.
pub async fn seed_station(app: &Router, admin: &str) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/v1/stations",
            Some(admin),
            Some(json!({"name": "Dock A"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

/// Books the third free slot of `station_id` and returns the booking body.
pub async fn seed_booking(app: &Router, station_id: &str, token: &str) -> Value {
    let (status, slots) = send(
        app,
        request("GET", &format!("/api/v1/slots/{station_id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let slot = slots[2].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/v1/book",
            Some(token),
            Some(json!({"stationId": station_id, "slot": slot})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}
