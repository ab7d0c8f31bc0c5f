//! Blob store abstraction

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::BlobStoreError;

/// An object opened for reading: its size (when the backend reports one)
/// and a chunked byte stream.
pub struct BlobObject {
    pub content_length: Option<i64>,
    pub stream: BoxStream<'static, Result<Bytes, std::io::Error>>,
}

/// Durable object store keyed by name.
///
/// Writes go through a [`BlobWrite`] handle so that bytes can be piped from
/// the request body with bounded buffering, and so that a failed upload can
/// be aborted without a partial object becoming visible to `open`/`list`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Begin a streamed write under `name`. The object becomes visible only
    /// once the returned writer's `finish` succeeds.
    async fn create(
        &self,
        name: &str,
        content_type: &str,
    ) -> Result<Box<dyn BlobWrite>, BlobStoreError>;

    /// Open a streamed read of the object stored under `name`.
    async fn open(&self, name: &str) -> Result<BlobObject, BlobStoreError>;

    /// Enumerate all stored object names. Either the full set is returned
    /// or the call fails; partial listings are never presented as complete.
    async fn list_names(&self) -> Result<Vec<String>, BlobStoreError>;
}

/// In-flight streamed write.
///
/// Exactly one of `finish` or `abort` consumes the writer. Dropping a
/// writer without finishing it must leave no visible object behind.
#[async_trait]
pub trait BlobWrite: Send {
    /// Append a chunk to the object being written.
    async fn write(&mut self, chunk: Bytes) -> Result<(), BlobStoreError>;

    /// Commit the object atomically.
    async fn finish(self: Box<Self>) -> Result<(), BlobStoreError>;

    /// Discard everything written so far.
    async fn abort(self: Box<Self>) -> Result<(), BlobStoreError>;
}
