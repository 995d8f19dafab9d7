use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::jwt::JwtIssuer;

/// Claims the resource server's access guard reads.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
}

#[derive(Clone, Debug)]
pub struct AuthService {
    jwt: JwtIssuer,
}

impl AuthService {
    pub fn new(jwt: JwtIssuer) -> Self {
        Self { jwt }
    }

    /// Issue an access token for a user who just proved their password.
    pub fn issue_access_token(
        &self,
        user_id: Uuid,
        email: &str,
        role: &str,
    ) -> Result<IssuedToken, AppError> {
        let ttl = self.jwt.ttl_seconds();
        let now = chrono::Utc::now().timestamp();

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + ttl as i64,
        };

        Ok(IssuedToken {
            token: self.jwt.sign(&claims)?,
            expires_in: ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{Algorithm, DecodingKey, Validation};

    use super::*;

    #[test]
    fn issued_token_carries_subject_role_and_lifetime() {
        let svc = AuthService::new(JwtIssuer::new("s3cret", 3600));
        let user_id = Uuid::new_v4();

        let issued = svc
            .issue_access_token(user_id, "ada@example.com", "user")
            .unwrap();
        assert_eq!(issued.expires_in, 3600);

        let data = jsonwebtoken::decode::<AccessTokenClaims>(
            &issued.token,
            &DecodingKey::from_secret(b"s3cret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.sub, user_id.to_string());
        assert_eq!(data.claims.role, "user");
        assert_eq!(data.claims.exp - data.claims.iat, 3600);
    }
}
