/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が token を検証して request extensions に格納し、
 *   handler はこの型だけを受け取る
 *
 * Notes
 * - token 検証は services::auth、所有者ルールは services::auth::policy の責務
 */

use uuid::Uuid;

use crate::services::auth::access_jwt::VerifiedAccessToken;

/// Context attached to an authenticated request, dropped when the request ends.
///
/// - `user_id` is the token subject (users.userId)
/// - `role` is copied from the token unchanged (`"admin"` overrides ownership)
/// - `email` is informational
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub role: Option<String>,
    pub email: Option<String>,
}

impl AuthCtx {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: None,
            email: None,
        }
    }
}

impl From<VerifiedAccessToken> for AuthCtx {
    fn from(v: VerifiedAccessToken) -> Self {
        Self {
            user_id: v.user_id,
            role: v.role,
            email: v.email,
        }
    }
}
