use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::middleware::auth::access::GuardRejection;
use crate::state::AppState;

use super::AuthCtx;

/// Extractor that hands the `AuthCtx` to a handler.
/// The access middleware must have inserted it into request extensions already;
/// a route mounted without the middleware answers 401.
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(AppError::Unauthenticated(GuardRejection::MissingToken))
    }
}
