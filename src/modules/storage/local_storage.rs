//! Local filesystem storage client
//!
//! Blobs live below a single root directory. Keys are relative, `/`-separated
//! paths of the form `{user_id}/v{version}/{filename}`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Filesystem-backed blob store
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet
    pub async fn ensure_root_exists(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory {}: {}",
                self.root.display(),
                e
            ))
        })?;
        info!("Upload directory ready: {}", self.root.display());
        Ok(())
    }

    /// Storage key for one version of a user's file
    pub fn key_for(user_id: Uuid, version: i32, filename: &str) -> String {
        format!("{}/v{}/{}", user_id, version, filename)
    }

    /// Map a key to a path below the root, refusing anything that could escape it
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let mut saw_component = false;

        for component in relative.components() {
            match component {
                Component::Normal(_) => saw_component = true,
                _ => {
                    return Err(AppError::BadRequest(format!(
                        "Invalid storage key '{}'",
                        key
                    )))
                }
            }
        }

        if !saw_component {
            return Err(AppError::BadRequest("Storage key is empty".to_string()));
        }

        Ok(self.root.join(relative))
    }

    /// Write a blob, replacing any previous content under the same key.
    ///
    /// Data goes to a temporary sibling first and is renamed into place, so
    /// readers never observe a partially written file.
    pub async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create directory for {}: {}", key, e))
            })?;
        }

        let tmp_path = path.with_file_name(format!(".{}.tmp", Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&tmp_path, data).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(AppError::Storage(format!("Failed to write {}: {}", key, e)));
        }

        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(AppError::Storage(format!("Failed to store {}: {}", key, e)));
        }

        debug!("Stored {} ({} bytes)", key, data.len());
        Ok(())
    }

    pub async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound("File not found".to_string()),
            _ => AppError::Storage(format!("Failed to read {}: {}", key, e)),
        })
    }

    /// Remove a blob. A missing blob is reported as `NotFound`.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        tokio::fs::remove_file(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!("File {} not found", key)),
            _ => AppError::Storage(format!("Failed to delete {}: {}", key, e)),
        })?;

        // Drop the now-empty version directory; failure only leaves an empty dir behind
        if let Some(parent) = path.parent() {
            if parent != self.root() {
                let _ = tokio::fs::remove_dir(parent).await;
            }
        }

        debug!("Deleted {}", key);
        Ok(())
    }

    /// Remove everything stored for a user. Succeeds if nothing was stored.
    pub async fn delete_user_dir(&self, user_id: Uuid) -> Result<()> {
        let path = self.root.join(user_id.to_string());
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {
                info!("Removed upload directory for user {}", user_id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Failed to remove upload directory for user {}: {}", user_id, e);
                Err(AppError::Storage(format!(
                    "Failed to remove files of user {}: {}",
                    user_id, e
                )))
            }
        }
    }
}
