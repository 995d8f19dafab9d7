/*
 * Responsibility
 * - POST /register: bcrypt hash 付きで `user` アカウントを作成
 * - POST /login: password を確認し、HS256 access token を発行
 * - 未登録 email と password 誤りは同じ 401 文言
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::api::v1::{
    dto::{
        credentials::CredentialsRequest,
        token_response::{MessageResponse, TokenResponse},
    },
    extractors::ApiJson,
};
use crate::error::AppError;
use crate::repos::error::RepoError;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    if !req.is_complete() {
        return Err(AppError::BadRequest("Email and password are required."));
    }
    let email = req.normalized_email();
    let hash = state.passwords.hash(&req.password).await?;

    let user = match state.users.create(&email, &hash).await {
        Ok(user) => user,
        Err(RepoError::Conflict) => {
            return Err(AppError::Conflict("An account with this email already exists."));
        }
        Err(e) => return Err(AppError::internal("An error occurred during registration.")(e)),
    };

    tracing::info!(user_id = %user.user_id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully.",
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    if !req.is_complete() {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS));
    }
    let email = req.normalized_email();

    let user = state
        .users
        .find_by_email(&email)
        .await
        .map_err(AppError::internal("An error occurred during login."))?;

    let Some(user) = user else {
        tracing::warn!("login for unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS));
    };
    if !state.passwords.verify(&req.password, &user.password_hash).await? {
        tracing::warn!(user_id = %user.user_id, "login with wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS));
    }

    let issued = state
        .auth
        .issue_access_token(user.user_id, &user.email, &user.role)?;

    tracing::info!(user_id = %user.user_id, "access token issued");
    Ok(Json(TokenResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_in: issued.expires_in,
    }))
}
