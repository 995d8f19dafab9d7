use std::sync::Arc;

use crate::repos::user_repo::UserRepo;
use crate::services::{auth::token_issuer::AuthService, password::PasswordHasher};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub auth: Arc<AuthService>,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(users: Arc<dyn UserRepo>, auth: Arc<AuthService>, passwords: PasswordHasher) -> Self {
        Self {
            users,
            auth,
            passwords,
        }
    }
}
