//! In-process object storage.

use std::collections::HashMap;

use async_trait::async_trait;
use keeper_core::{KeeperError, Result};
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

use crate::storage::{ObjectEntry, ObjectMeta, ObjectReader, ObjectStorage, StoredObject};

type Bucket = HashMap<String, StoredObject>;

/// Object storage held in memory. Contents are lost on drop.
pub struct MemoryObjectStorage {
    buckets: RwLock<HashMap<String, Bucket>>,
}

impl Default for MemoryObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryObjectStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
        }
    }
}

fn missing_bucket(bucket: &str) -> KeeperError {
    KeeperError::NotFound(format!("bucket '{bucket}'"))
}

fn missing_object(key: &str) -> KeeperError {
    KeeperError::NotFound(format!("file '{key}'"))
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let buckets = self.buckets.read().await;
        Ok(buckets.contains_key(bucket))
    }

    async fn make_bucket(&self, bucket: &str) -> Result<()> {
        let mut buckets = self.buckets.write().await;
        buckets.entry(bucket.to_string()).or_default();
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        mut content: ObjectReader,
        mut meta: ObjectMeta,
    ) -> Result<u64> {
        // Read before taking the lock
        let mut bytes = Vec::new();
        content
            .read_to_end(&mut bytes)
            .await
            .map_err(KeeperError::storage)?;
        let size = bytes.len() as u64;
        meta.size = size;

        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| missing_bucket(bucket))?;
        objects.insert(key.to_string(), StoredObject { meta, bytes });
        Ok(size)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        let buckets = self.buckets.read().await;
        buckets
            .get(bucket)
            .ok_or_else(|| missing_bucket(bucket))?
            .get(key)
            .cloned()
            .ok_or_else(|| missing_object(key))
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<Result<ObjectEntry>>> {
        let buckets = self.buckets.read().await;
        let Some(objects) = buckets.get(bucket) else {
            return Ok(Vec::new());
        };
        Ok(objects
            .iter()
            .map(|(key, object)| {
                Ok(ObjectEntry {
                    key: key.clone(),
                    meta: object.meta.clone(),
                })
            })
            .collect())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let mut buckets = self.buckets.write().await;
        buckets
            .get_mut(bucket)
            .ok_or_else(|| missing_bucket(bucket))?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| missing_object(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_core::ErrorKind;

    fn meta(name: &str) -> ObjectMeta {
        ObjectMeta {
            name: name.to_string(),
            metadata: "m".to_string(),
            size: 0,
        }
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let storage = MemoryObjectStorage::new();
        assert!(!storage.bucket_exists("u1").await.unwrap());
        storage.make_bucket("u1").await.unwrap();
        storage.make_bucket("u1").await.unwrap();
        assert!(storage.bucket_exists("u1").await.unwrap());

        let written = storage
            .put_object("u1", "f1", Box::new(&b"hello"[..]), meta("a.txt"))
            .await
            .unwrap();
        assert_eq!(written, 5);

        let object = storage.get_object("u1", "f1").await.unwrap();
        assert_eq!(object.bytes, b"hello");
        assert_eq!(object.meta.size, 5);

        storage.delete_object("u1", "f1").await.unwrap();
        let err = storage.get_object("u1", "f1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_missing_bucket() {
        let storage = MemoryObjectStorage::new();
        assert!(storage.list_objects("nobody").await.unwrap().is_empty());
        let err = storage
            .put_object("nobody", "f1", Box::new(&b""[..]), meta("a"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
