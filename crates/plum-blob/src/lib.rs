//! plum-blob: durable object storage behind the gateway
//!
//! Exposes the [`BlobStore`] abstraction the handlers stream through, an
//! S3/MinIO-backed implementation, and an in-memory implementation for
//! tests and local development.

pub mod error;
pub mod memory;
pub mod s3;
pub mod store;

pub use error::BlobStoreError;
pub use memory::MemoryBlobStore;
pub use s3::{S3BlobStore, S3Config};
pub use store::{BlobObject, BlobStore, BlobWrite};
