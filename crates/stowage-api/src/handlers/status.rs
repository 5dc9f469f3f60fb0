//! `GET /status` and `GET /stats`

use axum::{extract::State, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use crate::constants::STATUS_CHECK_TIMEOUT_SECS;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub db: bool,
    pub storage: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub users: i64,
    pub files: i64,
}

/// Run a dependency check with a timeout; anything but a timely `Ok` is unhealthy.
async fn check_dependency<F, E>(name: &str, check: F) -> bool
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(Duration::from_secs(STATUS_CHECK_TIMEOUT_SECS), check).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, dependency = name, "Status check failed");
            false
        }
        Err(_) => {
            tracing::warn!(dependency = name, "Status check timed out");
            false
        }
    }
}

#[utoipa::path(
    get,
    path = "/status",
    tag = "status",
    responses((status = 200, description = "Dependency health", body = StatusResponse))
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (db, storage) = tokio::join!(
        check_dependency("db", state.metadata.ping()),
        check_dependency("storage", state.storage.health_check()),
    );
    Json(StatusResponse { db, storage })
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "status",
    responses(
        (status = 200, description = "Record counts", body = StatsResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, HttpAppError> {
    let users = state.auth.users.count().await?;
    let files = state.metadata.count().await?;
    Ok(Json(StatsResponse { users, files }))
}
