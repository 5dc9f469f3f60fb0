use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::models::{OwnerContext, SessionToken};
use crate::constants::TOKEN_HEADER;
use crate::state::AppState;

/// Resolve `X-Token` into an [`OwnerContext`] request extension.
///
/// Never rejects: owner-scoped handlers reject through the `OwnerContext`
/// extractor, while the data endpoint treats a missing owner as anonymous. A
/// session store failure is logged and the request proceeds unauthenticated.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    if let Some(token) = token {
        match state.auth.sessions.resolve(&token).await {
            Ok(Some(user_id)) => {
                request.extensions_mut().insert(OwnerContext { user_id });
                request.extensions_mut().insert(SessionToken(token));
            }
            Ok(None) => {
                tracing::debug!("Unknown or expired session token");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed, treating request as anonymous");
            }
        }
    }

    next.run(request).await
}
