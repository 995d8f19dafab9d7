use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by access-token verification + claim validation.
///
/// The variants only feed server-side logs; callers see one generic rejection.
#[derive(Debug, Error)]
pub enum AccessJwtError {
    #[error("token expired")]
    Expired,
    #[error("signature does not verify")]
    InvalidSignature,
    #[error("malformed token: {0}")]
    Malformed(jsonwebtoken::errors::Error),
    #[error("empty '{0}' claim")]
    EmptyClaim(&'static str),
    #[error("invalid 'sub' (expected UUID)")]
    InvalidSubUuid,
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::Malformed(e),
        }
    }
}

impl AccessJwtError {
    /// Short tag for structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::InvalidSignature => "bad_signature",
            Self::Malformed(_) => "malformed",
            Self::EmptyClaim(_) => "empty_claim",
            Self::InvalidSubUuid => "invalid_sub",
        }
    }
}

/// Access token (JWT) claims as issued by the auth service.
///
/// NOTE:
/// - 旧 login が発行した token は subject を `id` に持つ。`sub` が無いときだけ使う
/// - 両方ある場合は `sub` が優先 (`id` は無視)
/// - `role` は optional、そのまま通す
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default, rename = "id")]
    pub legacy_id: Option<String>,
    pub exp: u64,

    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Verified token in the shape the rest of the app uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccessToken {
    pub user_id: Uuid,
    pub role: Option<String>,
    pub email: Option<String>,
}

/// HS256 access-token verifier holding the server secret.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(secret: &str, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.validate_exp = true;
        // aud は使わない
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature + `exp` and decode the claims.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, AccessJwtError> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify, check the subject, then convert into `VerifiedAccessToken`.
    ///
    /// This is the entry-point for the access middleware.
    pub fn verify_verified(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        let claims = self.verify(token)?;

        let sub = claims
            .sub
            .as_deref()
            .or(claims.legacy_id.as_deref())
            .map(str::trim)
            .unwrap_or_default();
        if sub.is_empty() {
            return Err(AccessJwtError::EmptyClaim("sub"));
        }
        let user_id = Uuid::parse_str(sub).map_err(|_| AccessJwtError::InvalidSubUuid)?;

        Ok(VerifiedAccessToken {
            user_id,
            role: claims.role,
            email: claims.email,
        })
    }
}
