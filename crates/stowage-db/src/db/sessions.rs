use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::{PgPool, Postgres};
use stowage_core::models::Session;
use stowage_core::AppError;
use uuid::Uuid;

/// Session tokens backing the authenticator.
///
/// Tokens are opaque and expire passively after their TTL; `resolve` never
/// returns an owner for an expired token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issue a fresh token for `user_id`, valid for `ttl`.
    async fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<Session, AppError>;

    /// Owner of a live token, if any.
    async fn resolve(&self, token: &str) -> Result<Option<Uuid>, AppError>;

    /// Delete a token. Returns whether a live session was removed.
    async fn revoke(&self, token: &str) -> Result<bool, AppError>;
}

/// Postgres-backed session store
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    #[tracing::instrument(skip(self), fields(db.table = "sessions", db.operation = "insert"))]
    async fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<Session, AppError> {
        let purged = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?
            .rows_affected();
        if purged > 0 {
            tracing::debug!(purged, "Purged expired sessions");
        }

        let session = sqlx::query_as::<Postgres, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token, user_id, created_at, expires_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(Utc::now() + ttl)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    #[tracing::instrument(skip(self, token), fields(db.table = "sessions", db.operation = "select"))]
    async fn resolve(&self, token: &str) -> Result<Option<Uuid>, AppError> {
        let user_id = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT user_id FROM sessions WHERE token = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id)
    }

    #[tracing::instrument(skip(self, token), fields(db.table = "sessions", db.operation = "delete"))]
    async fn revoke(&self, token: &str) -> Result<bool, AppError> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE token = $1 AND expires_at > NOW()")
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}
