//! HTTP handlers for upload, download and listing

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use plum_auth::RequireUploadKey;
use plum_core::{exceeds_upload_limit, Message, MAX_UPLOAD_BYTES};
use tracing::{error, info};
use utoipa::OpenApi;

use super::types::*;
use crate::error::ImageError;
use crate::{filetype, id};

/// Form field carrying the uploaded file
const UPLOAD_FIELD: &str = "fdata";

/// Stored objects are immutable, so clients may cache them for days as
/// long as they revalidate.
const CACHE_CONTROL: &str = "public, max-age=777600, must-revalidate";

/// Slack on top of the file ceiling for multipart framing (boundaries and
/// part headers), so a file just under the ceiling is not rejected because
/// the request as a whole is slightly larger than the file.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// OpenAPI documentation for the images API
#[derive(OpenApi)]
#[openapi(
    paths(upload_image, download_image, list_images),
    components(schemas(BucketItem, Message)),
    tags(
        (name = "Images", description = "Image and file storage operations")
    )
)]
pub struct ImagesApiDoc;

/// Configure image routes
pub fn configure_routes() -> Router<ImagesState> {
    Router::new()
        .route("/upload", post(upload_image))
        .route("/", get(list_images))
        .route("/{name}", get(download_image))
        // The default axum limit is far below the upload ceiling. The limit
        // bounds the whole request, so it sits above the file ceiling; the
        // exact file size gate lives in the upload handler.
        .layer(DefaultBodyLimit::max(
            (MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD) as usize,
        ))
}

/// Upload a file
#[utoipa::path(
    tag = "Images",
    post,
    path = "/images/upload",
    request_body(content = String, content_type = "multipart/form-data", description = "File in the 'fdata' form field"),
    responses(
        (status = 201, description = "File stored", body = BucketItem),
        (status = 400, description = "Malformed upload or unsupported file type", body = Message),
        (status = 403, description = "Missing or incorrect upload key", body = Message),
        (status = 413, description = "File size at or over 1 GiB", body = Message),
        (status = 500, description = "Storage failure", body = Message)
    ),
    security(("upload_key" = []))
)]
async fn upload_image(
    _key: RequireUploadKey,
    State(state): State<ImagesState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ImageError> {
    // Early gate on the transport-declared length, before any body bytes
    // are pulled. The declared length covers the file plus multipart
    // framing, so it only catches clearly oversized requests; the streamed
    // counter below enforces the exact file ceiling and also covers
    // chunked requests that carry no Content-Length.
    if let Some(declared) = declared_content_length(&headers) {
        if exceeds_upload_limit(declared.saturating_sub(MULTIPART_OVERHEAD)) {
            return Err(ImageError::PayloadTooLarge);
        }
    }

    let mut field = loop {
        match multipart
            .next_field()
            .await
            .map_err(|_| ImageError::InvalidMultipart)?
        {
            Some(candidate) if candidate.name() == Some(UPLOAD_FIELD) => break candidate,
            Some(_) => continue,
            None => return Err(ImageError::MissingFile),
        }
    };
    let original = field
        .file_name()
        .ok_or(ImageError::MissingFile)?
        .to_string();

    let extension = filetype::suffix(&original);
    let content_type = filetype::content_type_for(extension)
        .ok_or_else(|| ImageError::UnsupportedType(extension.to_string()))?;
    let name = format!("{}.{}", id::generate(), extension);

    let mut writer = state
        .store
        .create(&name, content_type)
        .await
        .map_err(|e| storage_failure(&name, &original, e))?;

    let mut received: u64 = 0;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                // Truncated or unreadable body after the write started.
                let _ = writer.abort().await;
                return Err(storage_failure(&name, &original, e));
            }
        };

        received += chunk.len() as u64;
        if exceeds_upload_limit(received) {
            let _ = writer.abort().await;
            return Err(ImageError::PayloadTooLarge);
        }

        if let Err(e) = writer.write(chunk).await {
            let _ = writer.abort().await;
            return Err(storage_failure(&name, &original, e));
        }
    }

    writer
        .finish()
        .await
        .map_err(|e| storage_failure(&name, &original, e))?;

    info!("stored {} ({} bytes, from '{}')", name, received, original);

    Ok((StatusCode::CREATED, Json(BucketItem { filename: name })))
}

/// Download a stored file
#[utoipa::path(
    tag = "Images",
    get,
    path = "/images/{name}",
    params(
        ("name" = String, Path, description = "Stored object name, e.g. 1a2b3c4d.png"),
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 400, description = "Unsupported file type", body = Message),
        (status = 404, description = "No object stored under that name", body = Message),
        (status = 500, description = "Storage failure", body = Message)
    )
)]
async fn download_image(
    State(state): State<ImagesState>,
    Path(name): Path<String>,
) -> Result<Response, ImageError> {
    // Refuse names the registry cannot type, even if the backing store
    // happens to hold such an object, and before any store I/O.
    let extension = filetype::suffix(&name);
    let content_type = filetype::content_type_for(extension)
        .ok_or_else(|| ImageError::UnsupportedType(extension.to_string()))?;

    let object = state.store.open(&name).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        Body::from_stream(object.stream),
    )
        .into_response())
}

/// List stored files
#[utoipa::path(
    tag = "Images",
    get,
    path = "/images/",
    responses(
        (status = 200, description = "Names of all stored objects", body = [BucketItem]),
        (status = 500, description = "Storage failure", body = Message)
    )
)]
async fn list_images(
    State(state): State<ImagesState>,
) -> Result<Json<Vec<BucketItem>>, ImageError> {
    let names = state.store.list_names().await?;
    Ok(Json(
        names
            .into_iter()
            .map(|filename| BucketItem { filename })
            .collect(),
    ))
}

fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn storage_failure(name: &str, original: &str, cause: impl std::fmt::Display) -> ImageError {
    error!("failed to store {} (from '{}'): {}", name, original, cause);
    ImageError::Storage
}
