//! Request and response types for the images handlers

use std::sync::Arc;

use axum::extract::FromRef;
use plum_auth::UploadSecret;
use plum_blob::BlobStore;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Application state for the images handlers.
///
/// Constructed once at startup; the store handle and the secret are the
/// only cross-request state, both read-only and cheap to clone.
#[derive(Clone)]
pub struct ImagesState {
    pub store: Arc<dyn BlobStore>,
    pub upload_secret: UploadSecret,
}

impl FromRef<ImagesState> for UploadSecret {
    fn from_ref(state: &ImagesState) -> Self {
        state.upload_secret.clone()
    }
}

/// One stored object, as returned by upload and list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BucketItem {
    /// Name under which the object is retrievable
    #[schema(example = "1a2b3c4d.png")]
    pub filename: String,
}
