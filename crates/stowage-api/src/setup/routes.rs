//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::auth::middleware::session_middleware;
use crate::constants::HTTP_CONCURRENCY_LIMIT;
use crate::handlers::{files, session, status, users};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use stowage_core::Config;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let app = api_routes()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        // Uploads arrive base64-encoded inside JSON; the body limit below applies instead.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes()))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(status::status))
        .route("/stats", get(status::stats))
        .route("/users", post(users::post_user))
        .route("/users/me", get(users::get_me))
        .route("/connect", get(session::connect))
        .route("/disconnect", get(session::disconnect))
        .route("/files", post(files::post_file).get(files::list_files))
        .route("/files/{id}", get(files::get_file))
        .route("/files/{id}/publish", put(files::publish_file))
        .route("/files/{id}/unpublish", put(files::unpublish_file))
        .route("/files/{id}/data", get(files::get_file_data))
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
