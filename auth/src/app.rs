use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Config, StoreBackend};
use crate::repos::{db::Database, memory::MemoryUserRepo, user_repo::PgUserRepo};
use crate::services::auth::{jwt::JwtIssuer, token_issuer::AuthService};
use crate::services::password::PasswordHasher;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG=info,auth=debug,tower_http=debug cargo run -p auth
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
        "starting auth service in {:?} mode on {} ({:?} store)",
        config.app_env,
        config.addr,
        config.store_backend
    );

    let state = build_state(&config)?;
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    let jwt = JwtIssuer::new(&config.jwt_secret, config.access_token_ttl_seconds);
    let auth = Arc::new(AuthService::new(jwt));
    let passwords = PasswordHasher::new(config.bcrypt_cost);

    let state = match config.store_backend {
        StoreBackend::Memory => AppState::new(Arc::new(MemoryUserRepo::new()), auth, passwords),
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let db = Arc::new(Database::new(url, config.database_max_connections));
            AppState::new(Arc::new(PgUserRepo::new(db)), auth, passwords)
        }
    };

    Ok(state)
}

fn build_router(state: AppState) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    // login フォームは別 origin から配信される
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use jsonwebtoken::{Algorithm, DecodingKey, Validation};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::services::auth::token_issuer::AccessTokenClaims;

    const SECRET: &str = "auth-test-secret";

    fn app() -> Router {
        let auth = Arc::new(AuthService::new(JwtIssuer::new(SECRET, 3600)));
        build_router(AppState::new(
            Arc::new(MemoryUserRepo::new()),
            auth,
            PasswordHasher::new(4),
        ))
    }

    async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn register_then_login_issues_a_bearer_token() {
        let app = app();

        let (status, body) = post(
            &app,
            "/api/v1/register",
            json!({"email": " Ada@Example.com ", "password": "pw-123456"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"message": "User registered successfully."}));

        let (status, body) = post(
            &app,
            "/api/v1/login",
            json!({"email": "ada@example.com", "password": "pw-123456"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 3600);

        let claims = jsonwebtoken::decode::<AccessTokenClaims>(
            body["token"].as_str().unwrap(),
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap()
        .claims;
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, "user");
        assert!(uuid::Uuid::parse_str(&claims.sub).is_ok());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let app = app();
        let creds = json!({"email": "bob@example.com", "password": "pw"});

        let (status, _) = post(&app, "/api/v1/register", creds.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = post(
            &app,
            "/api/v1/register",
            json!({"email": "BOB@example.com", "password": "other"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({"error": "An account with this email already exists."}));
    }

    #[tokio::test]
    async fn unparseable_body_gets_the_flat_error_shape() {
        let res = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()), "{body}");
    }

    #[tokio::test]
    async fn missing_fields_are_a_bad_request() {
        let (status, body) = post(&app(), "/api/v1/register", json!({"email": "x@y.z"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Email and password are required."}));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let app = app();
        post(
            &app,
            "/api/v1/register",
            json!({"email": "eve@example.com", "password": "right"}),
        )
        .await;

        let (s1, b1) = post(
            &app,
            "/api/v1/login",
            json!({"email": "eve@example.com", "password": "wrong"}),
        )
        .await;
        let (s2, b2) = post(
            &app,
            "/api/v1/login",
            json!({"email": "nobody@example.com", "password": "right"}),
        )
        .await;

        assert_eq!(s1, StatusCode::UNAUTHORIZED);
        assert_eq!(s2, StatusCode::UNAUTHORIZED);
        assert_eq!(b1, json!({"error": "Invalid email or password."}));
        assert_eq!(b1, b2);
    }
}
