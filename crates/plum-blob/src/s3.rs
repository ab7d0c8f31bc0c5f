//! S3/MinIO-backed blob store

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Region, SharedCredentialsProvider};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, warn};

use crate::error::BlobStoreError;
use crate::store::{BlobObject, BlobStore, BlobWrite};

/// Size of the in-memory part buffer for streamed writes. Uploads larger
/// than this are shipped as S3 multipart parts; memory use per upload stays
/// bounded by this constant regardless of object size.
const PART_SIZE: usize = 8 * 1024 * 1024;

/// Connection settings for the S3 backend
#[derive(Debug, Clone)]
pub struct S3Config {
    /// AWS region (e.g. "us-east-1")
    pub region: String,
    /// Custom endpoint for MinIO/S3-compatible storage
    pub endpoint: Option<String>,
    /// Bucket holding all stored objects
    pub bucket: String,
    /// Access key ID
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
}

/// Blob store over an S3-compatible backend
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Connect to the backend and make sure the bucket exists.
    pub async fn connect(config: &S3Config) -> Result<Self, BlobStoreError> {
        debug!("creating S3 client for region {}", config.region);

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "plum-blob",
        );
        let region_provider = RegionProviderChain::first_try(Region::new(config.region.clone()));

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region_provider)
            .credentials_provider(SharedCredentialsProvider::new(credentials));

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let shared = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);

        // Path-style addressing for MinIO compatibility
        if config.endpoint.is_some() {
            builder = builder.force_path_style(true);
        }

        let client = Client::from_conf(builder.build());
        let store = Self {
            client,
            bucket: config.bucket.clone(),
        };
        store.ensure_bucket().await?;

        Ok(store)
    }

    async fn ensure_bucket(&self) -> Result<(), BlobStoreError> {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
        {
            return Ok(());
        }

        debug!("bucket '{}' not found, creating it", self.bucket);
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                let cause = e.into_service_error();
                error!("failed to create bucket '{}': {}", self.bucket, cause);
                BlobStoreError::Backend(cause.to_string())
            })?;

        Ok(())
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn create(
        &self,
        name: &str,
        content_type: &str,
    ) -> Result<Box<dyn BlobWrite>, BlobStoreError> {
        debug!("PUT {} ({})", name, content_type);

        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(name)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                let cause = e.into_service_error();
                error!("failed to begin upload of {}: {}", name, cause);
                BlobStoreError::Backend(cause.to_string())
            })?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| BlobStoreError::Backend("no upload id returned".to_string()))?
            .to_string();

        Ok(Box::new(S3BlobWriter {
            client: self.client.clone(),
            bucket: self.bucket.clone(),
            key: name.to_string(),
            upload_id,
            buf: BytesMut::with_capacity(PART_SIZE),
            parts: Vec::new(),
            next_part_number: 1,
            done: false,
        }))
    }

    async fn open(&self, name: &str) -> Result<BlobObject, BlobStoreError> {
        debug!("GET {}", name);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| {
                let cause = e.into_service_error();
                if cause.is_no_such_key() {
                    BlobStoreError::NotFound(name.to_string())
                } else {
                    error!("failed to open {}: {}", name, cause);
                    BlobStoreError::Backend(cause.to_string())
                }
            })?;

        let content_length = response.content_length();
        let stream = ReaderStream::new(response.body.into_async_read()).boxed();

        Ok(BlobObject {
            content_length,
            stream,
        })
    }

    async fn list_names(&self) -> Result<Vec<String>, BlobStoreError> {
        let mut names = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.bucket);
            if let Some(token) = &continuation {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| {
                let cause = e.into_service_error();
                error!("failed to list bucket '{}': {}", self.bucket, cause);
                BlobStoreError::Backend(cause.to_string())
            })?;

            names.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            if !response.is_truncated().unwrap_or(false) {
                break;
            }
            continuation = response.next_continuation_token().map(str::to_string);
            if continuation.is_none() {
                break;
            }
        }

        Ok(names)
    }
}

/// Streamed multipart write into S3.
///
/// Chunks accumulate in a fixed-size buffer and are flushed as parts; the
/// object only becomes visible when `finish` completes the multipart
/// upload, so a failed or abandoned write is never served or listed.
struct S3BlobWriter {
    client: Client,
    bucket: String,
    key: String,
    upload_id: String,
    buf: BytesMut,
    parts: Vec<CompletedPart>,
    next_part_number: i32,
    done: bool,
}

impl S3BlobWriter {
    async fn flush_part(&mut self, part: Bytes) -> Result<(), BlobStoreError> {
        let part_number = self.next_part_number;

        let response = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(&self.key)
            .upload_id(&self.upload_id)
            .part_number(part_number)
            .body(ByteStream::from(part))
            .send()
            .await
            .map_err(|e| {
                let cause = e.into_service_error();
                error!(
                    "failed to upload part {} of {}: {}",
                    part_number, self.key, cause
                );
                BlobStoreError::Backend(cause.to_string())
            })?;

        self.parts.push(
            CompletedPart::builder()
                .set_e_tag(response.e_tag().map(str::to_string))
                .part_number(part_number)
                .build(),
        );
        self.next_part_number += 1;

        Ok(())
    }
}

#[async_trait]
impl BlobWrite for S3BlobWriter {
    async fn write(&mut self, chunk: Bytes) -> Result<(), BlobStoreError> {
        self.buf.extend_from_slice(&chunk);
        while self.buf.len() >= PART_SIZE {
            let part = self.buf.split_to(PART_SIZE).freeze();
            self.flush_part(part).await?;
        }
        Ok(())
    }

    async fn finish(mut self: Box<Self>) -> Result<(), BlobStoreError> {
        // S3 requires at least one part, even for an empty object.
        if !self.buf.is_empty() || self.parts.is_empty() {
            let part = self.buf.split().freeze();
            self.flush_part(part).await?;
        }

        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(self.parts.clone()))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(&self.key)
            .upload_id(&self.upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .map_err(|e| {
                let cause = e.into_service_error();
                error!("failed to complete upload of {}: {}", self.key, cause);
                BlobStoreError::Backend(cause.to_string())
            })?;

        self.done = true;
        Ok(())
    }

    async fn abort(mut self: Box<Self>) -> Result<(), BlobStoreError> {
        self.done = true;
        self.client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(&self.key)
            .upload_id(&self.upload_id)
            .send()
            .await
            .map_err(|e| BlobStoreError::Backend(e.into_service_error().to_string()))?;
        Ok(())
    }
}

impl Drop for S3BlobWriter {
    fn drop(&mut self) {
        if self.done {
            return;
        }

        // Reached when the request handler is cancelled mid-stream (client
        // disconnect). Release the in-flight multipart upload so the
        // backend does not accumulate orphaned parts.
        let client = self.client.clone();
        let bucket = std::mem::take(&mut self.bucket);
        let key = std::mem::take(&mut self.key);
        let upload_id = std::mem::take(&mut self.upload_id);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = client
                    .abort_multipart_upload()
                    .bucket(&bucket)
                    .key(&key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    warn!("failed to abort abandoned upload of {}: {}", key, e);
                }
            });
        }
    }
}
