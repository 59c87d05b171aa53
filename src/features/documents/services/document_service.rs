use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::{
    DeleteDocumentResponseDto, DocumentResponseDto, UploadResponseDto,
};
use crate::features::documents::models::{Document, NewDocument};
use crate::features::documents::repositories::DocumentRepository;
use crate::features::users::UserService;
use crate::modules::storage::LocalStorage;
use crate::shared::constants::{VERSION_INSERT_ATTEMPTS, VERSION_RETRY_DELAY_MS};
use crate::shared::validation::sanitize_filename;

/// A file received from a multipart upload
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A stored version together with its content
#[derive(Debug)]
pub struct DownloadedDocument {
    pub document: Document,
    pub data: Vec<u8>,
}

/// Service for versioned document storage
pub struct DocumentService {
    repository: Arc<dyn DocumentRepository>,
    users: Arc<UserService>,
    storage: Arc<LocalStorage>,
}

impl DocumentService {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        users: Arc<UserService>,
        storage: Arc<LocalStorage>,
    ) -> Self {
        Self {
            repository,
            users,
            storage,
        }
    }

    /// Store a new version of a file.
    ///
    /// The version number is the latest existing version plus one. Concurrent
    /// uploads of the same filename race on the unique version constraint; the
    /// loser re-reads the latest version and tries again.
    pub async fn upload(
        &self,
        user_id: Uuid,
        requester: &AuthenticatedUser,
        file: UploadedFile,
    ) -> Result<UploadResponseDto> {
        self.users
            .authorize_owner(user_id, requester, "upload files to")
            .await?;

        let filename = sanitize_filename(&file.filename)?;
        let checksum = hex::encode(Sha256::digest(&file.data));
        let file_size = file.data.len() as i64;

        let document = self
            .insert_next_version(user_id, &filename, &file.content_type, file_size, &checksum)
            .await?;

        if let Err(e) = self.storage.write(&document.storage_key, &file.data).await {
            // No blob means the row must not survive either
            if let Err(rollback) = self.repository.delete(document.id).await {
                error!(
                    "Failed to roll back document {} after storage error: {}",
                    document.id, rollback
                );
            }
            return Err(e);
        }

        // The version is already stored; the file list is bookkeeping only
        if let Err(e) = self.users.record_file_name(user_id, &filename).await {
            warn!(
                "Stored {} version {} but failed to record it for user {}: {}",
                filename, document.version, user_id, e
            );
        }

        info!(
            "Uploaded file {} version {} for user {} ({} bytes)",
            filename, document.version, user_id, file_size
        );

        Ok(UploadResponseDto {
            message: "File uploaded".to_string(),
            filename,
            version: document.version,
            document: document.into(),
        })
    }

    async fn insert_next_version(
        &self,
        user_id: Uuid,
        filename: &str,
        content_type: &str,
        file_size: i64,
        checksum: &str,
    ) -> Result<Document> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let latest = self.repository.latest_version(user_id, filename).await?;
            let version = latest.as_ref().map_or(1, |d| d.version + 1);

            let candidate = NewDocument {
                id: Uuid::new_v4(),
                user_id,
                filename: filename.to_string(),
                version,
                previous_version_id: latest.map(|d| d.id),
                content_type: content_type.to_string(),
                file_size,
                checksum: checksum.to_string(),
                storage_key: LocalStorage::key_for(user_id, version, filename),
            };

            match self.repository.insert(candidate).await {
                Ok(document) => return Ok(document),
                Err(AppError::Conflict(msg)) if attempt < VERSION_INSERT_ATTEMPTS => {
                    warn!(
                        "Version conflict on attempt {}/{}: {}",
                        attempt, VERSION_INSERT_ATTEMPTS, msg
                    );
                    tokio::time::sleep(Duration::from_millis(VERSION_RETRY_DELAY_MS)).await;
                }
                Err(AppError::Conflict(msg)) => {
                    return Err(AppError::Internal(format!(
                        "Could not allocate a version for {} after {} attempts: {}",
                        filename, VERSION_INSERT_ATTEMPTS, msg
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Every version of every file owned by the user
    pub async fn list(
        &self,
        user_id: Uuid,
        requester: &AuthenticatedUser,
    ) -> Result<Vec<DocumentResponseDto>> {
        self.users
            .authorize_owner(user_id, requester, "list files of")
            .await?;

        let documents = self.repository.list_by_user(user_id).await?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    /// Fetch one version of a file, or the latest when `version` is `None`
    pub async fn download(
        &self,
        user_id: Uuid,
        requester: &AuthenticatedUser,
        filename: &str,
        version: Option<i32>,
    ) -> Result<DownloadedDocument> {
        self.users
            .authorize_owner(user_id, requester, "download files of")
            .await?;

        let filename = sanitize_filename(filename)?;
        let document = match version {
            Some(v) => self.repository.find_version(user_id, &filename, v).await?,
            None => self.repository.latest_version(user_id, &filename).await?,
        }
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let data = self.storage.read(&document.storage_key).await?;
        debug!(
            "Serving {} version {} to user {}",
            document.filename, document.version, user_id
        );

        Ok(DownloadedDocument { document, data })
    }

    /// Remove every version of a file, blob and row.
    ///
    /// Each version is attempted even if an earlier one failed; failures are
    /// reported together.
    pub async fn delete(
        &self,
        user_id: Uuid,
        requester: &AuthenticatedUser,
        filename: &str,
    ) -> Result<DeleteDocumentResponseDto> {
        self.users
            .authorize_owner(user_id, requester, "delete files of")
            .await?;

        let filename = sanitize_filename(filename)?;
        let versions = self.repository.list_versions(user_id, &filename).await?;
        if versions.is_empty() {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        let mut failures = Vec::new();
        for document in &versions {
            match self.storage.delete(&document.storage_key).await {
                Ok(()) => {}
                Err(AppError::NotFound(_)) => {
                    warn!(
                        "Blob for {} version {} was already missing",
                        document.filename, document.version
                    );
                }
                Err(e) => {
                    error!(
                        "Error deleting {} version {} from disk: {}",
                        document.filename, document.version, e
                    );
                    failures.push(format!("Error deleting version {}", document.version));
                }
            }

            if let Err(e) = self.repository.delete(document.id).await {
                error!(
                    "Error deleting {} version {} from database: {}",
                    document.filename, document.version, e
                );
                failures.push(format!(
                    "Error removing version {} from database",
                    document.version
                ));
            }
        }

        if !failures.is_empty() {
            return Err(AppError::PartialFailure(failures));
        }

        info!(
            "Deleted all {} versions of {} for user {}",
            versions.len(),
            filename,
            user_id
        );

        Ok(DeleteDocumentResponseDto {
            message: "File deleted successfully".to_string(),
            deleted_versions: versions.len(),
        })
    }
}
