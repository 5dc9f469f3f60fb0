//! `GET /connect` and `GET /disconnect`

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use stowage_core::AppError;
use utoipa::ToSchema;

use crate::auth::basic::parse_basic_credentials;
use crate::auth::models::SessionToken;
use crate::auth::password::verify_password;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectResponse {
    pub token: String,
}

#[utoipa::path(
    get,
    path = "/connect",
    tag = "auth",
    params(("Authorization" = String, Header, description = "Basic base64(email:password)")),
    responses(
        (status = 200, description = "Session opened", body = ConnectResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse)
    )
)]
pub async fn connect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpAppError> {
    let credentials = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_basic_credentials)
        .ok_or_else(AppError::unauthorized)?;

    let user = state
        .auth
        .users
        .find_by_email(&credentials.email)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    if !verify_password(&credentials.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(AppError::unauthorized().into());
    }

    let session = state
        .auth
        .sessions
        .issue(user.id, state.auth.session_ttl)
        .await?;

    tracing::info!(user_id = %user.id, expires_at = %session.expires_at, "Session opened");
    Ok(Json(ConnectResponse {
        token: session.token,
    }))
}

#[utoipa::path(
    get,
    path = "/disconnect",
    tag = "auth",
    params(("X-Token" = String, Header, description = "Session token")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    SessionToken(token): SessionToken,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.auth.sessions.revoke(&token).await? {
        return Err(AppError::unauthorized().into());
    }

    Ok(StatusCode::NO_CONTENT)
}
