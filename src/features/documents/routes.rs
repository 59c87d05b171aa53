use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::documents::dtos::MAX_FILE_SIZE;
use crate::features::documents::handlers::{
    delete_document, download_document, list_documents, upload_document,
};
use crate::features::documents::services::DocumentService;

/// Owner-only document routes (require JWT authentication)
pub fn routes(service: Arc<DocumentService>) -> Router {
    Router::new()
        .route(
            "/users/{id}/upload",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            post(upload_document).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/users/{id}/files", get(list_documents))
        .route(
            "/users/{id}/files/{filename}",
            get(download_document).delete(delete_document),
        )
        .route("/users/{id}/files/{filename}/download", get(download_document))
        .route("/users/{id}/files/{filename}/delete", delete(delete_document))
        .with_state(service)
}
