//! Error types for the images data path

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use plum_blob::BlobStoreError;
use plum_core::status_message;
use thiserror::Error;

/// Errors a handler resolves into one HTTP status plus a short message.
///
/// Storage failures are logged server-side with full context at the point
/// of failure; the client only ever sees the generic message here.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("No file was provided in the 'fdata' form field")]
    MissingFile,

    #[error("Malformed multipart upload")]
    InvalidMultipart,

    #[error("File size exceeds 1GB")]
    PayloadTooLarge,

    #[error("Unknown file type {0}")]
    UnsupportedType(String),

    #[error("Not found!")]
    NotFound,

    #[error("Storage backend error, try again later")]
    Storage,
}

impl ImageError {
    fn status(&self) -> StatusCode {
        match self {
            ImageError::MissingFile | ImageError::InvalidMultipart => StatusCode::BAD_REQUEST,
            ImageError::UnsupportedType(_) => StatusCode::BAD_REQUEST,
            ImageError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ImageError::NotFound => StatusCode::NOT_FOUND,
            ImageError::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ImageError {
    fn into_response(self) -> Response {
        status_message(self.status(), self.to_string())
    }
}

impl From<BlobStoreError> for ImageError {
    fn from(error: BlobStoreError) -> Self {
        match error {
            BlobStoreError::NotFound(_) => ImageError::NotFound,
            BlobStoreError::Backend(_) => ImageError::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ImageError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ImageError::UnsupportedType("exe".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ImageError::PayloadTooLarge.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ImageError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ImageError::Storage.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unsupported_type_names_the_extension() {
        let message = ImageError::UnsupportedType("exe".into()).to_string();
        assert!(message.contains("exe"));
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let error: ImageError = BlobStoreError::NotFound("x.png".into()).into();
        assert!(matches!(error, ImageError::NotFound));
    }
}
