use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Wire value of `parentId` for top-level nodes.
pub const ROOT_SENTINEL: &str = "0";

/// What a node is. Only `File` and `Image` carry content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "node_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
    Image,
}

impl NodeKind {
    pub fn has_content(self) -> bool {
        !matches!(self, NodeKind::Folder)
    }
}

impl FromStr for NodeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folder" => Ok(NodeKind::Folder),
            "file" => Ok(NodeKind::File),
            "image" => Ok(NodeKind::Image),
            _ => Err(anyhow::anyhow!("Invalid node kind: {}", s)),
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NodeKind::Folder => write!(f, "folder"),
            NodeKind::File => write!(f, "file"),
            NodeKind::Image => write!(f, "image"),
        }
    }
}

/// A folder, file or image owned by exactly one user.
///
/// `content_ref` is the blob key inside the blob store and is set iff the kind
/// carries content. Only `is_public` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileNode {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub kind: NodeKind,
    pub is_public: bool,
    pub parent_id: Option<Uuid>,
    pub content_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FileNode {
    pub fn is_owned_by(&self, owner_id: Uuid) -> bool {
        self.owner_id == owner_id
    }
}

/// Insert payload for the metadata store; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewFileNode {
    pub owner_id: Uuid,
    pub name: String,
    pub kind: NodeKind,
    pub is_public: bool,
    pub parent_id: Option<Uuid>,
    pub content_ref: Option<String>,
}

impl NewFileNode {
    pub fn into_node(self, id: Uuid, created_at: DateTime<Utc>) -> FileNode {
        FileNode {
            id,
            owner_id: self.owner_id,
            name: self.name,
            kind: self.kind,
            is_public: self.is_public,
            parent_id: self.parent_id,
            content_ref: self.content_ref,
            created_at,
        }
    }
}

/// `parentId` as it arrives over the wire: clients send either the string
/// sentinel, a numeric `0`, or a node id.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RawParentId {
    Text(String),
    Number(i64),
}

/// Parent reference after boundary translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    Root,
    Node(Uuid),
    /// Not the sentinel and not a well-formed id; can never resolve to a node.
    Unresolvable,
}

impl ParentRef {
    pub fn from_wire(raw: Option<&RawParentId>) -> Self {
        match raw {
            None => ParentRef::Root,
            Some(RawParentId::Number(0)) => ParentRef::Root,
            Some(RawParentId::Number(_)) => ParentRef::Unresolvable,
            Some(RawParentId::Text(text)) => Self::parse(text),
        }
    }

    /// Parses a query-string or JSON string value. Empty means root.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text == ROOT_SENTINEL {
            return ParentRef::Root;
        }
        match Uuid::parse_str(text) {
            Ok(id) => ParentRef::Node(id),
            Err(_) => ParentRef::Unresolvable,
        }
    }
}

/// Wire form of a parent id.
pub fn parent_to_wire(parent_id: Option<Uuid>) -> String {
    match parent_id {
        Some(id) => id.to_string(),
        None => ROOT_SENTINEL.to_string(),
    }
}

/// Caller-facing projection of a node; never exposes the blob location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub is_public: bool,
    /// Parent node id, or `"0"` for top-level nodes
    pub parent_id: String,
}

impl From<FileNode> for NodeResponse {
    fn from(node: FileNode) -> Self {
        NodeResponse {
            id: node.id,
            user_id: node.owner_id,
            name: node.name,
            kind: node.kind,
            is_public: node.is_public,
            parent_id: parent_to_wire(node.parent_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_parsing_is_exact() {
        assert_eq!("image".parse::<NodeKind>().unwrap(), NodeKind::Image);
        assert!("Image".parse::<NodeKind>().is_err());
        assert!("video".parse::<NodeKind>().is_err());
        assert!(!NodeKind::Folder.has_content());
        assert!(NodeKind::File.has_content());
    }

    #[test]
    fn test_parent_ref_from_wire() {
        let id = Uuid::new_v4();
        assert_eq!(ParentRef::from_wire(None), ParentRef::Root);
        assert_eq!(
            ParentRef::from_wire(Some(&RawParentId::Number(0))),
            ParentRef::Root
        );
        assert_eq!(
            ParentRef::from_wire(Some(&RawParentId::Text("0".to_string()))),
            ParentRef::Root
        );
        assert_eq!(
            ParentRef::from_wire(Some(&RawParentId::Text(id.to_string()))),
            ParentRef::Node(id)
        );
        assert_eq!(
            ParentRef::from_wire(Some(&RawParentId::Number(42))),
            ParentRef::Unresolvable
        );
        assert_eq!(ParentRef::parse("not-an-id"), ParentRef::Unresolvable);
    }

    #[test]
    fn test_response_uses_root_sentinel() {
        let node = NewFileNode {
            owner_id: Uuid::new_v4(),
            name: "docs".to_string(),
            kind: NodeKind::Folder,
            is_public: false,
            parent_id: None,
            content_ref: None,
        }
        .into_node(Uuid::new_v4(), Utc::now());

        let json = serde_json::to_value(NodeResponse::from(node.clone())).unwrap();
        assert_eq!(json["parentId"], "0");
        assert_eq!(json["type"], "folder");
        assert_eq!(json["isPublic"], false);
        assert_eq!(json["userId"], node.owner_id.to_string());
        assert!(json.get("contentRef").is_none());
    }
}
