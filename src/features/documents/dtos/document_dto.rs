use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::documents::models::Document;

/// Upload form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentDto {
    /// The file to upload; `file` is accepted as an alternative field name
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub contract: String,
}

/// Metadata of one stored version
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponseDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub version: i32,
    /// Id of the version this one replaced
    pub previous_version_id: Option<Uuid>,
    pub content_type: String,
    /// Size in bytes
    pub file_size: i64,
    /// Hex-encoded SHA-256 of the content
    pub checksum: String,
    pub upload_date: DateTime<Utc>,
}

impl From<Document> for DocumentResponseDto {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            user_id: document.user_id,
            filename: document.filename,
            version: document.version,
            previous_version_id: document.previous_version_id,
            content_type: document.content_type,
            file_size: document.file_size,
            checksum: document.checksum,
            upload_date: document.upload_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    pub message: String,
    /// Stored (sanitized) filename
    pub filename: String,
    pub version: i32,
    pub document: DocumentResponseDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteDocumentResponseDto {
    pub message: String,
    /// Number of versions removed
    pub deleted_versions: usize,
}

/// Query parameters for downloading a file
#[derive(Debug, Deserialize, IntoParams)]
pub struct DownloadQuery {
    /// Version to download; the latest when omitted
    #[param(minimum = 1)]
    pub version: Option<i32>,
}

/// Allowed MIME types for document uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.oasis.opendocument.text",
    "application/rtf",
    "text/plain",
    "image/jpeg",
    "image/png",
    "application/octet-stream",
];

/// Maximum file size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Check if a MIME type is allowed; parameters such as `charset` are ignored
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_MIME_TYPES.contains(&essence.as_str())
}
