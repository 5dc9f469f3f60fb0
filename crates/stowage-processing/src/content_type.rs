/// Fallback when a name has no recognised extension
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Infer a content type from a node name's extension.
pub fn content_type_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(content_type_for("a.txt"), "text/plain");
        assert_eq!(content_type_for("photo.PNG"), "image/png");
        assert_eq!(content_type_for("scan.jpeg"), "image/jpeg");
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        assert_eq!(content_type_for("README"), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for("blob.zzz-unknown"), DEFAULT_CONTENT_TYPE);
    }
}
