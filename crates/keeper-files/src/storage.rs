//! The object storage collaborator.

use async_trait::async_trait;
use keeper_core::Result;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

/// A readable upload body.
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

/// User metadata attached to every object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Metadata")]
    pub metadata: String,
    #[serde(default)]
    pub size: u64,
}

/// An object's content with its metadata.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub meta: ObjectMeta,
    pub bytes: Vec<u8>,
}

/// One listed object.
#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub key: String,
    pub meta: ObjectMeta,
}

/// Bucket-scoped blob storage.
///
/// Missing buckets and objects are reported as `NotFound`; every other
/// backend fault is a `Storage` error.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Create a bucket. Creating an existing bucket is not an error.
    async fn make_bucket(&self, bucket: &str) -> Result<()>;

    /// Store `content` under `key`, returning the number of bytes written.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content: ObjectReader,
        meta: ObjectMeta,
    ) -> Result<u64>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject>;

    /// List a bucket. Each entry is its own `Result` so a damaged object
    /// does not hide the rest; a missing bucket lists as empty.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<Result<ObjectEntry>>>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;
}
