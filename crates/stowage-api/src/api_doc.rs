//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::services::files::CreateFileRequest;
use stowage_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stowage API",
        version = "0.1.0",
        description = "Per-user file and folder storage with public sharing and automatic image thumbnails."
    ),
    paths(
        // Users and sessions
        handlers::users::post_user,
        handlers::users::get_me,
        handlers::session::connect,
        handlers::session::disconnect,
        // Files
        handlers::files::post_file,
        handlers::files::get_file,
        handlers::files::list_files,
        handlers::files::publish_file,
        handlers::files::unpublish_file,
        handlers::files::get_file_data,
        // Status
        handlers::status::status,
        handlers::status::stats,
    ),
    components(schemas(
        error::ErrorResponse,
        CreateFileRequest,
        models::NodeResponse,
        models::NodeKind,
        models::RawParentId,
        models::UserResponse,
        handlers::users::CreateUserRequest,
        handlers::session::ConnectResponse,
        handlers::status::StatusResponse,
        handlers::status::StatsResponse,
    )),
    tags(
        (name = "users", description = "Registration"),
        (name = "auth", description = "Session tokens"),
        (name = "files", description = "Files, folders and images"),
        (name = "status", description = "Health and counters")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let spec = ApiDoc::openapi();
        for path in [
            "/users",
            "/users/me",
            "/connect",
            "/disconnect",
            "/files",
            "/files/{id}",
            "/files/{id}/publish",
            "/files/{id}/unpublish",
            "/files/{id}/data",
            "/status",
            "/stats",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
