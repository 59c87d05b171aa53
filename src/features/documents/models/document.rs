use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for one stored version of a user's file
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    /// Starts at 1 and is unique per (user_id, filename)
    pub version: i32,
    pub previous_version_id: Option<Uuid>,
    pub content_type: String,
    pub file_size: i64,
    /// Hex-encoded SHA-256 of the content
    pub checksum: String,
    /// Key of the blob in local storage
    pub storage_key: String,
    pub upload_date: DateTime<Utc>,
}

/// Fields needed to insert a document version
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub version: i32,
    pub previous_version_id: Option<Uuid>,
    pub content_type: String,
    pub file_size: i64,
    pub checksum: String,
    pub storage_key: String,
}
