//! In-memory [`DocumentRepository`] used by the test suites.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::documents::models::{Document, NewDocument};
use crate::features::documents::repositories::DocumentRepository;

#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentRepository {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl MemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for MemoryDocumentRepository {
    async fn latest_version(&self, user_id: Uuid, filename: &str) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|d| d.user_id == user_id && d.filename == filename)
            .max_by_key(|d| d.version)
            .cloned())
    }

    async fn insert(&self, document: NewDocument) -> Result<Document> {
        let mut documents = self.documents.write().await;
        if documents.iter().any(|d| {
            d.user_id == document.user_id
                && d.filename == document.filename
                && d.version == document.version
        }) {
            return Err(AppError::Conflict(format!(
                "Version {} of {} already exists",
                document.version, document.filename
            )));
        }

        let inserted = Document {
            id: document.id,
            user_id: document.user_id,
            filename: document.filename,
            version: document.version,
            previous_version_id: document.previous_version_id,
            content_type: document.content_type,
            file_size: document.file_size,
            checksum: document.checksum,
            storage_key: document.storage_key,
            upload_date: Utc::now(),
        };
        documents.push(inserted.clone());
        Ok(inserted)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut owned: Vec<Document> = documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.filename.cmp(&b.filename).then(a.version.cmp(&b.version)));
        Ok(owned)
    }

    async fn list_versions(&self, user_id: Uuid, filename: &str) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut versions: Vec<Document> = documents
            .iter()
            .filter(|d| d.user_id == user_id && d.filename == filename)
            .cloned()
            .collect();
        versions.sort_by_key(|d| d.version);
        Ok(versions)
    }

    async fn find_version(
        &self,
        user_id: Uuid,
        filename: &str,
        version: i32,
    ) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|d| d.user_id == user_id && d.filename == filename && d.version == version)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| d.id != id);
        Ok(documents.len() < before)
    }
}
