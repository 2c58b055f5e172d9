//! The file service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use keeper_core::config::StorageSettings;
use keeper_core::{id, normalize_file_name, File, KeeperError, KeyListing, Result};
use tracing::{debug, warn};

use crate::storage::{ObjectMeta, ObjectReader, ObjectStorage};

/// An upload on its way into storage.
pub struct CreateFileDto {
    pub name: String,
    pub size: u64,
    /// Ciphertext, stored as object metadata.
    pub metadata: String,
    pub content: ObjectReader,
}

/// File secrets, scoped to an owner. Each owner gets one bucket.
#[async_trait]
pub trait FileService: Send + Sync {
    /// Store an upload under a fresh id, returning that id.
    async fn create(&self, owner_id: &str, dto: CreateFileDto) -> Result<String>;

    async fn get_file(&self, owner_id: &str, id: &str) -> Result<File>;

    /// `(id, stored name)` for every file of the owner. Entries that fail to
    /// list are logged and skipped.
    async fn get_files_list(&self, owner_id: &str) -> Result<Vec<KeyListing>>;

    async fn delete(&self, owner_id: &str, id: &str) -> Result<()>;
}

/// Timeouts applied to storage calls.
#[derive(Debug, Clone, Copy)]
pub struct FileServiceConfig {
    pub list_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Default for FileServiceConfig {
    fn default() -> Self {
        Self {
            list_timeout: Duration::from_secs(5),
            upload_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&StorageSettings> for FileServiceConfig {
    fn from(settings: &StorageSettings) -> Self {
        Self {
            list_timeout: Duration::from_secs(settings.list_timeout_secs),
            upload_timeout: Duration::from_secs(settings.upload_timeout_secs),
        }
    }
}

/// [`FileService`] over any [`ObjectStorage`].
#[derive(Clone)]
pub struct DefaultFileService {
    storage: Arc<dyn ObjectStorage>,
    config: FileServiceConfig,
}

impl DefaultFileService {
    pub fn new(storage: Arc<dyn ObjectStorage>, config: FileServiceConfig) -> Self {
        Self { storage, config }
    }

    async fn ensure_bucket(&self, owner_id: &str) -> Result<()> {
        if !self.storage.bucket_exists(owner_id).await? {
            warn!(owner_id, "Bucket missing, creating it");
            self.storage.make_bucket(owner_id).await?;
        }
        Ok(())
    }
}

fn require_owner(owner_id: &str) -> Result<()> {
    if owner_id.is_empty() {
        return Err(KeeperError::Validation("missing owner id".to_string()));
    }
    Ok(())
}

fn require_ids(owner_id: &str, id: &str) -> Result<()> {
    require_owner(owner_id)?;
    if id.is_empty() {
        return Err(KeeperError::Validation("missing id".to_string()));
    }
    Ok(())
}

#[async_trait]
impl FileService for DefaultFileService {
    async fn create(&self, owner_id: &str, dto: CreateFileDto) -> Result<String> {
        require_owner(owner_id)?;
        self.ensure_bucket(owner_id).await?;

        let file_id = id::new_id();
        let meta = ObjectMeta {
            name: normalize_file_name(&dto.name),
            metadata: dto.metadata,
            size: dto.size,
        };

        let upload = self
            .storage
            .put_object(owner_id, &file_id, dto.content, meta);
        let written = tokio::time::timeout(self.config.upload_timeout, upload)
            .await
            .map_err(|_| KeeperError::storage_msg("file upload timed out"))??;

        debug!(owner_id, file_id = %file_id, size = written, "Stored file");
        Ok(file_id)
    }

    async fn get_file(&self, owner_id: &str, id: &str) -> Result<File> {
        require_ids(owner_id, id)?;

        let object = self.storage.get_object(owner_id, id).await?;
        Ok(File {
            id: id.to_string(),
            name: object.meta.name,
            size: object.meta.size,
            bytes: object.bytes,
            metadata: object.meta.metadata,
        })
    }

    async fn get_files_list(&self, owner_id: &str) -> Result<Vec<KeyListing>> {
        require_owner(owner_id)?;

        let listing = self.storage.list_objects(owner_id);
        let entries = tokio::time::timeout(self.config.list_timeout, listing)
            .await
            .map_err(|_| KeeperError::storage_msg("file listing timed out"))??;

        let mut files = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Ok(entry) => files.push(KeyListing::new(entry.key, entry.meta.name)),
                Err(e) => warn!(owner_id, error = %e, "Skipping unreadable file entry"),
            }
        }
        Ok(files)
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<()> {
        require_ids(owner_id, id)?;

        self.storage.delete_object(owner_id, id).await?;
        debug!(owner_id, file_id = id, "Deleted file");
        Ok(())
    }
}
