use serde::Deserialize;
use stowage_core::models::RawParentId;
use utoipa::ToSchema;

/// Body of `POST /files`. Every field is optional at the parsing level so that
/// missing fields produce the ordered validation messages.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    pub name: Option<String>,
    /// One of `folder`, `file`, `image`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Parent folder id, or `"0"` / `0` for the root
    #[schema(value_type = Option<String>)]
    pub parent_id: Option<RawParentId>,
    pub is_public: Option<bool>,
    /// Base64-encoded content, required unless `type` is `folder`
    pub data: Option<String>,
}
