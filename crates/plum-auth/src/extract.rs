//! Axum extractor enforcing the upload secret

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::Response;
use plum_core::status_message;

use crate::secret::UploadSecret;

/// Extractor that rejects the request unless the `Authorization` header
/// matches the configured upload secret.
///
/// Place it first in a handler's argument list so that no other work (in
/// particular, no storage interaction) happens for unauthorized callers.
pub struct RequireUploadKey;

impl<S> FromRequestParts<S> for RequireUploadKey
where
    S: Send + Sync,
    UploadSecret: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let secret = UploadSecret::from_ref(state);
        let presented = parts
            .headers
            .get(header::AUTHORIZATION)
            .map(|value| value.as_bytes())
            .unwrap_or_default();

        if secret.verify(presented) {
            Ok(RequireUploadKey)
        } else {
            Err(status_message(StatusCode::FORBIDDEN, "Unauthorized"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    #[derive(Clone)]
    struct TestState(UploadSecret);

    impl FromRef<TestState> for UploadSecret {
        fn from_ref(state: &TestState) -> Self {
            state.0.clone()
        }
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/images/upload");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (parts, _) = builder.body(Body::empty()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_missing_header_is_rejected() {
        let state = TestState(UploadSecret::new("sekret").unwrap());
        let mut parts = parts_with_auth(None);
        let result = RequireUploadKey::from_request_parts(&mut parts, &state).await;
        let rejection = result.err().expect("expected rejection");
        assert_eq!(rejection.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_wrong_header_is_rejected() {
        let state = TestState(UploadSecret::new("sekret").unwrap());
        let mut parts = parts_with_auth(Some("not-the-secret"));
        let result = RequireUploadKey::from_request_parts(&mut parts, &state).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_matching_header_is_accepted() {
        let state = TestState(UploadSecret::new("sekret").unwrap());
        let mut parts = parts_with_auth(Some("sekret"));
        let result = RequireUploadKey::from_request_parts(&mut parts, &state).await;
        assert!(result.is_ok());
    }
}
