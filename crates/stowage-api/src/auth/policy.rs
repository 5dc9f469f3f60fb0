//! The one authorization predicate for file nodes.

use stowage_core::models::FileNode;
use stowage_core::AppError;
use uuid::Uuid;

/// What the caller wants to do with a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Owner-scoped access: metadata, use as a parent, mutation.
    Owner,
    /// Content read: allowed to anyone on public nodes.
    Read,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Authorized,
    Denied,
}

pub fn authorize(requester: Option<Uuid>, node: &FileNode, access: Access) -> Authorization {
    let is_owner = requester.is_some_and(|id| node.is_owned_by(id));
    let allowed = match access {
        Access::Owner => is_owner,
        Access::Read => node.is_public || is_owner,
    };

    if allowed {
        Authorization::Authorized
    } else {
        Authorization::Denied
    }
}

impl Authorization {
    /// Denials surface as "Not found" so foreign ids look absent.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Authorization::Authorized => Ok(()),
            Authorization::Denied => Err(AppError::node_not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stowage_core::models::NodeKind;

    fn node(owner_id: Uuid, is_public: bool) -> FileNode {
        FileNode {
            id: Uuid::new_v4(),
            owner_id,
            name: "a.txt".to_string(),
            kind: NodeKind::File,
            is_public,
            parent_id: None,
            content_ref: Some(Uuid::new_v4().to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_access_requires_owner() {
        let owner = Uuid::new_v4();
        let public = node(owner, true);

        assert_eq!(authorize(Some(owner), &public, Access::Owner), Authorization::Authorized);
        assert_eq!(
            authorize(Some(Uuid::new_v4()), &public, Access::Owner),
            Authorization::Denied
        );
        assert_eq!(authorize(None, &public, Access::Owner), Authorization::Denied);
    }

    #[test]
    fn test_read_access_on_private_node() {
        let owner = Uuid::new_v4();
        let private = node(owner, false);

        assert_eq!(authorize(Some(owner), &private, Access::Read), Authorization::Authorized);
        assert_eq!(
            authorize(Some(Uuid::new_v4()), &private, Access::Read),
            Authorization::Denied
        );
        assert_eq!(authorize(None, &private, Access::Read), Authorization::Denied);
    }

    #[test]
    fn test_read_access_on_public_node() {
        let public = node(Uuid::new_v4(), true);
        assert_eq!(authorize(None, &public, Access::Read), Authorization::Authorized);
    }

    #[test]
    fn test_denied_maps_to_not_found() {
        let err = Authorization::Denied.into_result().unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Not found"));
    }
}
