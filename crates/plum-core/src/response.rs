//! JSON response envelope shared by every handler crate

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every non-payload response: a single human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Message {
    /// Human-readable description of the outcome
    #[schema(example = "Unknown file type exe")]
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build a response with the given status and a JSON `{message}` body.
pub fn status_message(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(Message::new(message))).into_response()
}
