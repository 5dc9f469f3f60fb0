use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use stowage_core::models::Session;
use stowage_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::SessionStore;

#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<Session, AppError> {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired_at(now));
        sessions.insert(session.token.clone(), session.clone());
        Ok(session)
    }

    async fn resolve(&self, token: &str) -> Result<Option<Uuid>, AppError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .await
            .get(token)
            .filter(|s| !s.is_expired_at(now))
            .map(|s| s.user_id))
    }

    async fn revoke(&self, token: &str) -> Result<bool, AppError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .write()
            .await
            .remove(token)
            .is_some_and(|s| !s.is_expired_at(now)))
    }
}
