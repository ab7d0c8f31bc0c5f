//! In-memory blob store for tests and local development

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream;
use futures::StreamExt;

use crate::error::BlobStoreError;
use crate::store::{BlobObject, BlobStore, BlobWrite};

type Objects = Arc<Mutex<HashMap<String, Bytes>>>;

/// Blob store keeping everything in a process-local map.
///
/// Mirrors the commit semantics of the S3 store: an object appears only
/// when its writer finishes, never on abort or drop.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    objects: Objects,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn create(
        &self,
        name: &str,
        _content_type: &str,
    ) -> Result<Box<dyn BlobWrite>, BlobStoreError> {
        Ok(Box::new(MemoryBlobWriter {
            objects: Arc::clone(&self.objects),
            name: name.to_string(),
            buf: BytesMut::new(),
        }))
    }

    async fn open(&self, name: &str) -> Result<BlobObject, BlobStoreError> {
        let data = {
            let objects = self.objects.lock().expect("blob map poisoned");
            objects
                .get(name)
                .cloned()
                .ok_or_else(|| BlobStoreError::NotFound(name.to_string()))?
        };

        Ok(BlobObject {
            content_length: Some(data.len() as i64),
            stream: stream::once(async move { Ok::<_, std::io::Error>(data) }).boxed(),
        })
    }

    async fn list_names(&self) -> Result<Vec<String>, BlobStoreError> {
        let objects = self.objects.lock().expect("blob map poisoned");
        let mut names: Vec<String> = objects.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

struct MemoryBlobWriter {
    objects: Objects,
    name: String,
    buf: BytesMut,
}

#[async_trait]
impl BlobWrite for MemoryBlobWriter {
    async fn write(&mut self, chunk: Bytes) -> Result<(), BlobStoreError> {
        self.buf.extend_from_slice(&chunk);
        Ok(())
    }

    async fn finish(self: Box<Self>) -> Result<(), BlobStoreError> {
        let MemoryBlobWriter { objects, name, buf } = *self;
        let mut objects = objects.lock().expect("blob map poisoned");
        objects.insert(name, buf.freeze());
        Ok(())
    }

    async fn abort(self: Box<Self>) -> Result<(), BlobStoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    async fn collect(object: BlobObject) -> Bytes {
        let chunks: Vec<Bytes> = object.stream.try_collect().await.unwrap();
        chunks.concat().into()
    }

    #[tokio::test]
    async fn test_finished_write_is_visible() {
        let store = MemoryBlobStore::new();
        let mut writer = store.create("a.png", "image/png").await.unwrap();
        writer.write(Bytes::from_static(b"hello ")).await.unwrap();
        writer.write(Bytes::from_static(b"world")).await.unwrap();
        writer.finish().await.unwrap();

        let object = store.open("a.png").await.unwrap();
        assert_eq!(object.content_length, Some(11));
        assert_eq!(collect(object).await.as_ref(), b"hello world");
        assert_eq!(store.list_names().await.unwrap(), vec!["a.png"]);
    }

    #[tokio::test]
    async fn test_aborted_write_leaves_nothing() {
        let store = MemoryBlobStore::new();
        let mut writer = store.create("a.png", "image/png").await.unwrap();
        writer.write(Bytes::from_static(b"partial")).await.unwrap();
        writer.abort().await.unwrap();

        assert!(matches!(
            store.open("a.png").await,
            Err(BlobStoreError::NotFound(_))
        ));
        assert!(store.list_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_writer_leaves_nothing() {
        let store = MemoryBlobStore::new();
        let mut writer = store.create("a.png", "image/png").await.unwrap();
        writer.write(Bytes::from_static(b"partial")).await.unwrap();
        drop(writer);

        assert!(store.list_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_missing_is_not_found() {
        let store = MemoryBlobStore::new();
        assert!(matches!(
            store.open("nope.png").await,
            Err(BlobStoreError::NotFound(_))
        ));
    }
}
