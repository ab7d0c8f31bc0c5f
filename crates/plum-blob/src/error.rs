//! Error types for the blob store

use thiserror::Error;

/// Errors raised by blob store implementations.
///
/// `Backend` carries the underlying cause for server-side logging; callers
/// surface it to clients as a generic storage failure.
#[derive(Error, Debug)]
pub enum BlobStoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}
