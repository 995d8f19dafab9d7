/*
 * Responsibility
 * - bcrypt の hash / verify (spawn_blocking で async runtime の外で実行)
 */
use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let cost = self.cost;
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password hashing task failed");
                AppError::Internal("An error occurred during registration.")
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "password hashing failed");
                AppError::Internal("An error occurred during registration.")
            })
    }

    /// A malformed stored hash counts as a mismatch.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let res = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password verification task failed");
                AppError::Internal("An error occurred during login.")
            })?;

        Ok(res.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored password hash is unreadable");
            false
        }))
    }
}
