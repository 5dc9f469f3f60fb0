use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;
use stowage_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;

/// Owner resolved from a live session token, stored in request extensions by
/// the session middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerContext {
    pub user_id: Uuid,
}

/// Raw token of the resolved session, for `GET /disconnect`.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Required authentication: rejects with 401 when no live session was resolved.
impl<S> FromRequestParts<S> for OwnerContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<OwnerContext>()
            .copied()
            .ok_or_else(|| HttpAppError(AppError::unauthorized()))
    }
}

/// Optional authentication: a missing or invalid token is an anonymous caller.
#[derive(Debug, Clone, Copy)]
pub struct MaybeOwner(pub Option<OwnerContext>);

impl MaybeOwner {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.map(|ctx| ctx.user_id)
    }
}

impl<S> FromRequestParts<S> for MaybeOwner
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeOwner(parts.extensions.get::<OwnerContext>().copied()))
    }
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionToken>()
            .cloned()
            .ok_or_else(|| HttpAppError(AppError::unauthorized()))
    }
}
