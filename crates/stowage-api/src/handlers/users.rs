//! `POST /users` and `GET /users/me`

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;
use stowage_core::models::UserResponse;
use stowage_core::AppError;
use stowage_db::db::users::DUPLICATE_EMAIL;
use utoipa::ToSchema;

use crate::auth::password::hash_password;
use crate::auth::OwnerContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing field or email taken", body = ErrorResponse)
    )
)]
pub async fn post_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let email = request
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::validation("Missing email"))?;
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("Missing password"))?;

    if state.auth.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()).into());
    }

    let password_hash = hash_password(&password)?;
    // The store still rejects a concurrent duplicate with the same conflict.
    let user = state.auth.users.create(&email, &password_hash).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    params(("X-Token" = String, Header, description = "Session token")),
    responses(
        (status = 200, description = "The connected user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
) -> Result<Json<UserResponse>, HttpAppError> {
    let user = state
        .auth
        .users
        .find_by_id(owner.user_id)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    Ok(Json(UserResponse::from(user)))
}
