//! Upload size limits

/// Ceiling for a single upload, in bytes (1 GiB).
///
/// Uploads must be strictly smaller than this; a declared or streamed size
/// at or over the ceiling is rejected before the body is buffered.
pub const MAX_UPLOAD_BYTES: u64 = 1_073_741_824;

/// Returns true when a declared or accumulated size is at or over the
/// upload ceiling.
pub fn exceeds_upload_limit(size_bytes: u64) -> bool {
    size_bytes >= MAX_UPLOAD_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_byte_under_ceiling_is_accepted() {
        assert!(!exceeds_upload_limit(MAX_UPLOAD_BYTES - 1));
    }

    #[test]
    fn test_exact_ceiling_is_rejected() {
        assert!(exceeds_upload_limit(MAX_UPLOAD_BYTES));
    }

    #[test]
    fn test_over_ceiling_is_rejected() {
        assert!(exceeds_upload_limit(MAX_UPLOAD_BYTES + 1));
        assert!(exceeds_upload_limit(u64::MAX));
    }

    #[test]
    fn test_small_sizes_are_accepted() {
        assert!(!exceeds_upload_limit(0));
        assert!(!exceeds_upload_limit(1024));
    }
}
