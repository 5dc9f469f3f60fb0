//! Shared key generation for the blob store.

use stowage_core::models::ThumbnailSize;
use uuid::Uuid;

/// A fresh, collision-free key for an original blob.
pub fn new_blob_key() -> String {
    Uuid::new_v4().to_string()
}

/// Deterministic key of a resized variant: `{key}_{width}`.
///
/// Regenerating a variant targets the same key, so writes are overwrites.
pub fn variant_key(key: &str, size: ThumbnailSize) -> String {
    format!("{}_{}", key, size.width())
}

/// Keys are single path components made of ASCII alphanumerics, `-` and `_`.
pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_key_format() {
        assert_eq!(variant_key("abc", ThumbnailSize::W250), "abc_250");
        assert_eq!(variant_key("abc", ThumbnailSize::W500), "abc_500");
    }

    #[test]
    fn test_generated_keys_are_valid_and_distinct() {
        let a = new_blob_key();
        let b = new_blob_key();
        assert_ne!(a, b);
        assert!(is_valid_key(&a));
        assert!(is_valid_key(&variant_key(&a, ThumbnailSize::W100)));
    }

    #[test]
    fn test_key_validation() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("../etc/passwd"));
        assert!(!is_valid_key("/etc/passwd"));
        assert!(!is_valid_key("nested/key"));
        assert!(!is_valid_key(".."));
    }
}
