use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use stowage_core::models::User;
use stowage_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::users::DUPLICATE_EMAIL;
use crate::db::UserStore;

/// Users keyed by email
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.id == id).cloned())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.users.read().await.len() as i64)
    }
}
