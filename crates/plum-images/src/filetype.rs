//! Fixed extension-to-content-type registry
//!
//! The single source of truth for which file kinds the gateway accepts.
//! Intentionally static configuration: growing it is a code change, and a
//! change here retroactively affects how already-stored objects are served,
//! since content types are recomputed from the name suffix at read time.

const TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpg"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("mp4", "video/mp4"),
];

/// Canonical content type for an accepted extension. Matching is
/// case-sensitive on the literal suffix.
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
}

/// Whether the extension is an accepted file kind.
pub fn is_accepted(extension: &str) -> bool {
    content_type_for(extension).is_some()
}

/// The suffix after the final `.` of a filename. A name without a dot
/// yields the whole name, which no registry entry will match.
pub fn suffix(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions_have_stable_types() {
        assert_eq!(content_type_for("png"), Some("image/png"));
        assert_eq!(content_type_for("jpg"), Some("image/jpg"));
        assert_eq!(content_type_for("webp"), Some("image/webp"));
        assert_eq!(content_type_for("gif"), Some("image/gif"));
        assert_eq!(content_type_for("mp4"), Some("video/mp4"));
        // Stable across calls
        assert_eq!(content_type_for("png"), content_type_for("png"));
    }

    #[test]
    fn test_unknown_extensions_are_rejected() {
        assert!(!is_accepted("exe"));
        assert!(!is_accepted("svg"));
        assert!(!is_accepted(""));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(!is_accepted("PNG"));
        assert!(!is_accepted("Jpg"));
    }

    #[test]
    fn test_suffix_extraction() {
        assert_eq!(suffix("photo.png"), "png");
        assert_eq!(suffix("archive.tar.gz"), "gz");
        assert_eq!(suffix("noext"), "noext");
        assert_eq!(suffix("trailing."), "");
    }
}
