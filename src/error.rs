/*
 * Responsibility
 * - アプリ共通の AppError 定義 (handler / middleware)
 * - IntoResponse 実装 (HTTP status + `{"error": "..."}` body)
 * - repo / id codec / guard / JSON body の各エラーからの変換
 */
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::middleware::auth::access::GuardRejection;
use crate::repos::error::RepoError;
use crate::services::id_codec::IdCodecError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Unauthenticated(#[from] GuardRejection),
    #[error("{message}")]
    Forbidden { message: &'static str },
    #[error("{resource} not found.")]
    NotFound { resource: &'static str },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(&'static str),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn forbidden() -> Self {
        Self::Forbidden {
            message: "Forbidden",
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Maps a repo failure to a 500 carrying an operation-specific message.
    pub fn store_failure(message: &'static str) -> impl FnOnce(RepoError) -> AppError {
        move |e| {
            tracing::error!(error = %e, "{message}");
            AppError::Internal(message)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::conflict("Resource already exists."),
            RepoError::Db(e) => {
                tracing::error!(error = %e, "store failure");
                AppError::Internal("internal server error")
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        // missing content-type / syntax / wrong shape: いずれも 400 にまとめる
        AppError::BadRequest(e.body_text())
    }
}

impl From<IdCodecError> for AppError {
    fn from(e: IdCodecError) -> Self {
        match e {
            // 公開 ID が不正 (例: /bookings/{id})
            IdCodecError::DecodeInvalidFormat | IdCodecError::DecodeOutOfRange => {
                AppError::bad_request("invalid id")
            }
            // サーバ側の設定ミス / 実装ミス
            other => {
                tracing::error!(error = %other, "id codec failure");
                AppError::Internal("internal server error")
            }
        }
    }
}
