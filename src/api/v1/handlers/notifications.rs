/*
 * Responsibility
 * - GET /notifications: caller の通知を新しい順に
 * - POST /notify: caller 宛の通知を保存 (メール送信はしない)
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::notifications::{NotificationResponse, NotifyRequest, NotifyResponse},
        extractors::{ApiJson, AuthCtxExtractor},
    },
    error::AppError,
    state::AppState,
};

const LIST_LIMIT: i64 = 50;

pub async fn list_notifications(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let rows = state
        .notifications
        .list_for_user(ctx.user_id, LIST_LIMIT)
        .await
        .map_err(AppError::store_failure("Failed to list notifications."))?;

    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(NotificationResponse {
            id: state.id_codec.encode(row.notification_id)?,
            message: row.message,
            created_at: row.created_at,
        });
    }
    Ok(Json(res))
}

pub async fn notify(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    ApiJson(req): ApiJson<NotifyRequest>,
) -> Result<Json<NotifyResponse>, AppError> {
    let message = req.validate().map_err(AppError::bad_request)?;

    let row = state
        .notifications
        .create(ctx.user_id, message)
        .await
        .map_err(AppError::store_failure("Failed to handle notification."))?;

    tracing::info!(
        notification_id = row.notification_id,
        user_id = %ctx.user_id,
        "notification stored; email delivery disabled"
    );
    Ok(Json(NotifyResponse {
        status: "Notification handled (email disabled).",
    }))
}
