use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::{
    is_mime_type_allowed, DeleteDocumentResponseDto, DocumentResponseDto, DownloadQuery,
    UploadDocumentDto, UploadResponseDto, ALLOWED_MIME_TYPES, MAX_FILE_SIZE,
};
use crate::features::documents::services::{DocumentService, UploadedFile};
use crate::shared::constants::{UPLOAD_FIELD_ALIAS, UPLOAD_FIELD_NAME};
use crate::shared::types::{ApiResponse, Meta};
use crate::shared::validation::parse_user_id;

/// Upload a new version of a file
///
/// Accepts multipart/form-data with the file in the `contract` field
/// (`file` is accepted too). Uploading an existing filename creates the next version.
#[utoipa::path(
    post,
    path = "/users/{id}/upload",
    tag = "documents",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body(
        content = UploadDocumentDto,
        content_type = "multipart/form-data",
        description = "Multipart form with the file in the `contract` field",
    ),
    responses(
        (status = 201, description = "File uploaded", body = ApiResponse<UploadResponseDto>),
        (status = 400, description = "Invalid form, file type or size"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponseDto>>)> {
    let id = parse_user_id(&id)?;
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest("Unable to parse form".to_string())
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        if field_name != UPLOAD_FIELD_NAME && field_name != UPLOAD_FIELD_ALIAS {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let filename = field.file_name().unwrap_or_default().to_string();

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest("Error retrieving the file".to_string())
        })?;

        upload = Some(UploadedFile {
            filename,
            content_type,
            data: data.to_vec(),
        });
    }

    let upload =
        upload.ok_or_else(|| AppError::BadRequest("Error retrieving the file".to_string()))?;

    if upload.data.is_empty() {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }

    if upload.data.len() > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    if !is_mime_type_allowed(&upload.content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            upload.content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    let response = service.upload(id, &user, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(response),
            Some("File uploaded".to_string()),
            None,
        )),
    ))
}

/// List every version of every file of a user
#[utoipa::path(
    get,
    path = "/users/{id}/files",
    tag = "documents",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Stored versions", body = ApiResponse<Vec<DocumentResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_documents(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<DocumentResponseDto>>>> {
    let id = parse_user_id(&id)?;
    let documents = service.list(id, &user).await?;
    let total = documents.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(documents),
        None,
        Some(Meta { total }),
    )))
}

/// Download a file
///
/// Returns the latest version unless `version` is given.
#[utoipa::path(
    get,
    path = "/users/{id}/files/{filename}",
    tag = "documents",
    params(
        ("id" = String, Path, description = "User ID"),
        ("filename" = String, Path, description = "Stored filename"),
        DownloadQuery
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path((id, filename)): Path<(String, String)>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse> {
    let id = parse_user_id(&id)?;
    let downloaded = service
        .download(id, &user, &filename, query.version)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&downloaded.document.filename),
            ),
        ],
        downloaded.data,
    ))
}

/// Delete every version of a file
#[utoipa::path(
    delete,
    path = "/users/{id}/files/{filename}",
    tag = "documents",
    params(
        ("id" = String, Path, description = "User ID"),
        ("filename" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "All versions deleted", body = ApiResponse<DeleteDocumentResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Some versions could not be deleted")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path((id, filename)): Path<(String, String)>,
) -> Result<Json<ApiResponse<DeleteDocumentResponseDto>>> {
    let id = parse_user_id(&id)?;
    let response = service.delete(id, &user, &filename).await?;

    Ok(Json(ApiResponse::success(
        Some(response),
        Some("File deleted successfully".to_string()),
        None,
    )))
}

/// `attachment` disposition with an ASCII fallback name and the exact UTF-8 name
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
