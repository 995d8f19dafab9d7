/*
 * Responsibility
 * - axum::Json の薄いラッパー
 * - JsonRejection (plain text) を AppError::BadRequest に変換し、`{"error": ...}` に揃える
 *
 * Notes
 * - 所有者チェックより後に body を評価したい handler は `Result<ApiJson<T>, AppError>` で受け、
 *   load_then_authorize の後で `?` する
 */
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(status = %rejection.status(), "rejected request body");
            AppError::from(rejection)
        })?;
        Ok(Self(value))
    }
}
