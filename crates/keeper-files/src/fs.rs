//! Filesystem object storage.
//!
//! Layout: `<root>/<bucket>/<key>.bin` holds the content and
//! `<root>/<bucket>/<key>.meta.json` the object metadata. Content is copied to
//! `<key>.part` and renamed into place once complete. The metadata file is
//! written last, so an object only lists once its content is complete.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use keeper_core::id::is_safe_name;
use keeper_core::{KeeperError, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::storage::{ObjectEntry, ObjectMeta, ObjectReader, ObjectStorage, StoredObject};

const CONTENT_SUFFIX: &str = ".bin";
const META_SUFFIX: &str = ".meta.json";

/// Removes the content file of an unfinished upload unless committed. Runs on
/// error returns and when the upload future is dropped mid-copy.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != IoErrorKind::NotFound {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove partial upload"
                );
            }
        }
    }
}

/// Object storage rooted at a directory.
pub struct FsObjectStorage {
    root: PathBuf,
}

impl FsObjectStorage {
    /// Create a store rooted at `root`. The directory is created on demand.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        check_name("bucket", bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_paths(&self, bucket: &str, key: &str) -> Result<(PathBuf, PathBuf)> {
        let dir = self.bucket_dir(bucket)?;
        check_name("object", key)?;
        Ok((
            dir.join(format!("{key}{CONTENT_SUFFIX}")),
            dir.join(format!("{key}{META_SUFFIX}")),
        ))
    }
}

fn check_name(what: &str, name: &str) -> Result<()> {
    if is_safe_name(name) {
        Ok(())
    } else {
        Err(KeeperError::Validation(format!(
            "invalid {what} name '{name}'"
        )))
    }
}

/// Map a missing path to `NotFound`, anything else to `Storage`.
fn io_error(err: std::io::Error, what: &str) -> KeeperError {
    if err.kind() == IoErrorKind::NotFound {
        KeeperError::NotFound(what.to_string())
    } else {
        KeeperError::storage(err)
    }
}

async fn read_meta(path: &Path) -> Result<ObjectMeta> {
    let raw = fs::read(path).await.map_err(KeeperError::storage)?;
    serde_json::from_slice(&raw).map_err(KeeperError::storage)
}

#[async_trait]
impl ObjectStorage for FsObjectStorage {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let dir = self.bucket_dir(bucket)?;
        match fs::metadata(&dir).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
            Err(e) => Err(KeeperError::storage(e)),
        }
    }

    async fn make_bucket(&self, bucket: &str) -> Result<()> {
        let dir = self.bucket_dir(bucket)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(KeeperError::storage)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            fs::set_permissions(&dir, perms)
                .await
                .map_err(KeeperError::storage)?;
        }

        debug!(path = %dir.display(), "Created bucket");
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        mut content: ObjectReader,
        mut meta: ObjectMeta,
    ) -> Result<u64> {
        let (content_path, meta_path) = self.object_paths(bucket, key)?;
        if !self.bucket_exists(bucket).await? {
            return Err(KeeperError::NotFound(format!("bucket '{bucket}'")));
        }

        let partial_path = content_path.with_extension("part");
        let mut file = fs::File::create(&partial_path)
            .await
            .map_err(KeeperError::storage)?;
        let mut partial = PartialFile::new(partial_path);
        let size = tokio::io::copy(&mut content, &mut file)
            .await
            .map_err(KeeperError::storage)?;
        file.flush().await.map_err(KeeperError::storage)?;
        drop(file);
        fs::rename(&partial.path, &content_path)
            .await
            .map_err(KeeperError::storage)?;
        partial.path = content_path;

        meta.size = size;
        let encoded = serde_json::to_vec(&meta).map_err(KeeperError::storage)?;
        let temp_path = meta_path.with_extension("tmp");
        let written = async {
            fs::write(&temp_path, encoded).await?;
            fs::rename(&temp_path, &meta_path).await
        }
        .await;
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(KeeperError::storage(e));
        }
        partial.commit();

        Ok(size)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        let (content_path, meta_path) = self.object_paths(bucket, key)?;
        let what = format!("file '{key}'");

        let raw_meta = fs::read(&meta_path)
            .await
            .map_err(|e| io_error(e, &what))?;
        let meta: ObjectMeta = serde_json::from_slice(&raw_meta).map_err(KeeperError::storage)?;
        let bytes = fs::read(&content_path)
            .await
            .map_err(|e| io_error(e, &what))?;

        Ok(StoredObject { meta, bytes })
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<Result<ObjectEntry>>> {
        let dir = self.bucket_dir(bucket)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(KeeperError::storage(e)),
        };

        let mut listed = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(KeeperError::storage)? {
            let file_name = entry.file_name();
            let Some(key) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(META_SUFFIX))
            else {
                continue;
            };
            let key = key.to_string();
            listed.push(read_meta(&entry.path()).await.map(|meta| ObjectEntry { key, meta }));
        }
        Ok(listed)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let (content_path, meta_path) = self.object_paths(bucket, key)?;
        let what = format!("file '{key}'");

        // Metadata first: once it is gone the object no longer lists
        fs::remove_file(&meta_path)
            .await
            .map_err(|e| io_error(e, &what))?;
        match fs::remove_file(&content_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(KeeperError::storage(e)),
        }
    }
}
