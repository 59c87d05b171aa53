use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::core::database::{is_unique_violation, with_timeout};
use crate::core::error::{AppError, Result};
use crate::features::documents::models::{Document, NewDocument};

/// Persistence for document version metadata
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Highest version of a user's file, if any
    async fn latest_version(&self, user_id: Uuid, filename: &str) -> Result<Option<Document>>;

    /// Fails with `Conflict` when (user_id, filename, version) already exists
    async fn insert(&self, document: NewDocument) -> Result<Document>;

    /// Every version of every file, ordered by filename then version
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Document>>;

    /// All versions of one file, oldest first
    async fn list_versions(&self, user_id: Uuid, filename: &str) -> Result<Vec<Document>>;

    async fn find_version(
        &self,
        user_id: Uuid,
        filename: &str,
        version: i32,
    ) -> Result<Option<Document>>;

    /// Returns whether a row was deleted
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// PostgreSQL-backed [`DocumentRepository`]
pub struct PgDocumentRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn latest_version(&self, user_id: Uuid, filename: &str) -> Result<Option<Document>> {
        with_timeout(
            self.query_timeout,
            "find latest document version",
            sqlx::query_as::<_, Document>(
                r#"
                SELECT * FROM documents
                WHERE user_id = $1 AND filename = $2
                ORDER BY version DESC
                LIMIT 1
                "#,
            )
            .bind(user_id)
            .bind(filename)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn insert(&self, document: NewDocument) -> Result<Document> {
        let result = with_timeout(
            self.query_timeout,
            "insert document",
            sqlx::query_as::<_, Document>(
                r#"
                INSERT INTO documents (
                    id, user_id, filename, version, previous_version_id,
                    content_type, file_size, checksum, storage_key
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
                "#,
            )
            .bind(document.id)
            .bind(document.user_id)
            .bind(&document.filename)
            .bind(document.version)
            .bind(document.previous_version_id)
            .bind(&document.content_type)
            .bind(document.file_size)
            .bind(&document.checksum)
            .bind(&document.storage_key)
            .fetch_one(&self.pool),
        )
        .await;

        match result {
            Err(AppError::Database(ref e)) if is_unique_violation(e) => {
                Err(AppError::Conflict(format!(
                    "Version {} of {} already exists",
                    document.version, document.filename
                )))
            }
            other => other,
        }
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Document>> {
        with_timeout(
            self.query_timeout,
            "list user documents",
            sqlx::query_as::<_, Document>(
                "SELECT * FROM documents WHERE user_id = $1 ORDER BY filename, version",
            )
            .bind(user_id)
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn list_versions(&self, user_id: Uuid, filename: &str) -> Result<Vec<Document>> {
        with_timeout(
            self.query_timeout,
            "list document versions",
            sqlx::query_as::<_, Document>(
                "SELECT * FROM documents WHERE user_id = $1 AND filename = $2 ORDER BY version",
            )
            .bind(user_id)
            .bind(filename)
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn find_version(
        &self,
        user_id: Uuid,
        filename: &str,
        version: i32,
    ) -> Result<Option<Document>> {
        with_timeout(
            self.query_timeout,
            "find document version",
            sqlx::query_as::<_, Document>(
                "SELECT * FROM documents WHERE user_id = $1 AND filename = $2 AND version = $3",
            )
            .bind(user_id)
            .bind(filename)
            .bind(version)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = with_timeout(
            self.query_timeout,
            "delete document",
            sqlx::query("DELETE FROM documents WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
