//! access token (HS256 JWT) 検証 → AuthCtx を extensions に入れる
//!
//! - guard 配下の route は `Authorization: Bearer <jwt>` 必須
//! - header 欠落/形式不正 と token 検証失敗 は別々の 401 body
//!   なぜ失敗したか (署名 / 期限 / claims) は
//!   log にだけ出す
//! - 拒否時は handler を実行しない

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use thiserror::Error;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Why a request never reached its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardRejection {
    #[error("Unauthorized: No token provided")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
}

/// Put the access guard in front of every route of `router`.
///
/// Example:
/// ```ignore
/// let protected = Router::new().route("/book", post(create_booking));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // route_layer: マッチしない path は 401 ではなく 404 のまま
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

/// Token substring after `Bearer `; empty segments count as missing.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, GuardRejection> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(GuardRejection::MissingToken)?;

    let token = auth
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(GuardRejection::MissingToken)?;

    if token.is_empty() {
        return Err(GuardRejection::MissingToken);
    }
    Ok(token)
}

/// Extract + verify the bearer credential. No I/O apart from logging.
pub fn authenticate(auth: &AuthService, headers: &HeaderMap) -> Result<AuthCtx, GuardRejection> {
    let token = bearer_token(headers).inspect_err(|_| {
        tracing::debug!("request without bearer token");
    })?;

    match auth.verify_verified(token) {
        Ok(verified) => Ok(AuthCtx::from(verified)),
        Err(err) => {
            tracing::warn!(
                reason = err.reason(),
                error = %err,
                "access token verification failed"
            );
            Err(GuardRejection::InvalidToken)
        }
    }
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_ctx = authenticate(&state.auth, req.headers())?;
    tracing::debug!(user_id = %auth_ctx.user_id, "authenticated");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}
