//! `/files` handlers

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use stowage_core::models::{NodeResponse, ParentRef, ThumbnailSize};
use stowage_core::AppError;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::{MaybeOwner, OwnerContext};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::files::CreateFileRequest;
use crate::state::AppState;

/// Path ids that are not UUIDs can never match a node.
fn parse_node_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::node_not_found())
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListFilesQuery {
    /// Folder id, or `0` for the root (default)
    pub parent_id: Option<String>,
    /// Zero-based page number; anything unparseable is page 0
    pub page: Option<String>,
}

impl ListFilesQuery {
    fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 0)
            .unwrap_or(0)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FileDataQuery {
    /// Thumbnail width: 500, 250 or 100. Other values are ignored.
    pub size: Option<String>,
}

#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    request_body = CreateFileRequest,
    params(("X-Token" = String, Header, description = "Session token")),
    responses(
        (status = 201, description = "Node created", body = NodeResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn post_file(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    ValidatedJson(request): ValidatedJson<CreateFileRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let node = state.files.create(owner.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(NodeResponse::from(node))))
}

#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "Node id"),
        ("X-Token" = String, Header, description = "Session token")
    ),
    responses(
        (status = 200, description = "Node metadata", body = NodeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No such node for this owner", body = ErrorResponse)
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_node_id(&id)?;
    let node = state.files.get_metadata(owner.user_id, id).await?;
    Ok(Json(NodeResponse::from(node)))
}

#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    params(
        ListFilesQuery,
        ("X-Token" = String, Header, description = "Session token")
    ),
    responses(
        (status = 200, description = "One page of nodes", body = [NodeResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    Query(query): Query<ListFilesQuery>,
) -> Json<Vec<NodeResponse>> {
    let parent = ParentRef::parse(query.parent_id.as_deref().unwrap_or_default());
    let nodes = state.files.list(owner.user_id, parent, query.page()).await;
    Json(nodes.into_iter().map(NodeResponse::from).collect())
}

#[utoipa::path(
    put,
    path = "/files/{id}/publish",
    tag = "files",
    params(
        ("id" = String, Path, description = "Node id"),
        ("X-Token" = String, Header, description = "Session token")
    ),
    responses(
        (status = 200, description = "Node is public", body = NodeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No such node for this owner", body = ErrorResponse)
    )
)]
pub async fn publish_file(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    set_visibility(&state, owner, &id, true).await
}

#[utoipa::path(
    put,
    path = "/files/{id}/unpublish",
    tag = "files",
    params(
        ("id" = String, Path, description = "Node id"),
        ("X-Token" = String, Header, description = "Session token")
    ),
    responses(
        (status = 200, description = "Node is private", body = NodeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No such node for this owner", body = ErrorResponse)
    )
)]
pub async fn unpublish_file(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    set_visibility(&state, owner, &id, false).await
}

async fn set_visibility(
    state: &AppState,
    owner: OwnerContext,
    id: &str,
    value: bool,
) -> Result<Json<NodeResponse>, HttpAppError> {
    let id = parse_node_id(id)?;
    let node = state.files.set_public(owner.user_id, id, value).await?;
    Ok(Json(NodeResponse::from(node)))
}

#[utoipa::path(
    get,
    path = "/files/{id}/data",
    tag = "files",
    params(
        ("id" = String, Path, description = "Node id"),
        FileDataQuery,
        ("X-Token" = Option<String>, Header, description = "Session token, needed for private nodes")
    ),
    responses(
        (status = 200, description = "Raw content", content_type = "application/octet-stream"),
        (status = 400, description = "Node is a folder", body = ErrorResponse),
        (status = 404, description = "Missing, private or not generated yet", body = ErrorResponse)
    )
)]
pub async fn get_file_data(
    State(state): State<Arc<AppState>>,
    requester: MaybeOwner,
    Path(id): Path<String>,
    Query(query): Query<FileDataQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_node_id(&id)?;
    let size = query.size.as_deref().and_then(ThumbnailSize::from_query);

    let content = state
        .files
        .get_content(requester.user_id(), id, size)
        .await?;

    Ok((
        [(header::CONTENT_TYPE, content.content_type)],
        Body::from_stream(content.stream),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_query(page: Option<&str>) -> ListFilesQuery {
        ListFilesQuery {
            parent_id: None,
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn test_page_defaults_to_zero() {
        assert_eq!(list_query(None).page(), 0);
        assert_eq!(list_query(Some("abc")).page(), 0);
        assert_eq!(list_query(Some("-3")).page(), 0);
        assert_eq!(list_query(Some(" 2 ")).page(), 2);
    }

    #[test]
    fn test_malformed_id_is_not_found() {
        assert!(matches!(
            parse_node_id("not-a-uuid"),
            Err(AppError::NotFound(_))
        ));
        assert!(parse_node_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
