//! Filesystem blob store rooted at a single directory.
//!
//! Object paths map one-to-one onto files below the root. Writes go to a
//! temp file in the destination directory and are moved into place, so a
//! reader never observes a partially written document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{validate_object_path, BlobError, BlobStore};

pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> Result<PathBuf, BlobError> {
        validate_object_path(path)?;
        Ok(self.root.join(path))
    }

    /// Whether an object exists at `path`.
    pub async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        let full = self.full_path(path)?;
        Ok(fs::try_exists(full).await?)
    }

    /// Read an object back. Used by the extraction engine and tests.
    pub async fn read(&self, path: &str) -> Result<Vec<u8>, BlobError> {
        let full = self.full_path(path)?;
        match fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        overwrite: bool,
    ) -> Result<(), BlobError> {
        let full = self.full_path(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp = full.with_file_name(format!(".{}.tmp", Uuid::new_v4()));
        let written = async {
            let mut file = fs::File::create(&temp).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            Ok::<_, std::io::Error>(())
        }
        .await;
        if let Err(e) = written {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        let placed = if overwrite {
            fs::rename(&temp, &full).await
        } else {
            // hard_link fails with AlreadyExists instead of replacing the target.
            match fs::hard_link(&temp, &full).await {
                Ok(()) => fs::remove_file(&temp).await,
                Err(e) => Err(e),
            }
        };

        if let Err(e) = placed {
            let _ = fs::remove_file(&temp).await;
            return Err(match e.kind() {
                std::io::ErrorKind::AlreadyExists => BlobError::AlreadyExists(path.to_string()),
                _ => e.into(),
            });
        }

        tracing::debug!(
            storage_path = %path,
            content_type,
            size = bytes.len(),
            "Blob stored"
        );
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), BlobError> {
        let full = self.full_path(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => {
                tracing::debug!(storage_path = %path, "Blob removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
