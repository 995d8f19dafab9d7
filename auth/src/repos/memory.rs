use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_repo::{DEFAULT_ROLE, UserRepo, UserRow};

/// Users keyed by email (STORE_BACKEND=memory, tests).
#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    users: RwLock<HashMap<String, UserRow>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, email: &str, password_hash: &str) -> RepoResult<UserRow> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(RepoError::Conflict);
        }

        let row = UserRow {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role: DEFAULT_ROLE.to_string(),
            created_at: Utc::now(),
        };
        users.insert(email.to_string(), row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        Ok(self.users.read().await.get(email).cloned())
    }
}
