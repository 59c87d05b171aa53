use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::app;
use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::documents::{dtos as documents_dtos, handlers as documents_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        app::health_check,
        // Auth
        auth_handlers::login,
        // Users
        users_handlers::list_users,
        users_handlers::create_user,
        users_handlers::get_user_by_email,
        users_handlers::update_user,
        users_handlers::delete_user,
        users_handlers::search_users,
        // Documents
        documents_handlers::upload_document,
        documents_handlers::list_documents,
        documents_handlers::download_document,
        documents_handlers::delete_document,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth_dtos::LoginRequestDto,
            auth_dtos::LoginResponseDto,
            ApiResponse<auth_dtos::LoginResponseDto>,
            // Users
            users_dtos::CreateUserDto,
            users_dtos::UpdateUserDto,
            users_dtos::UserResponseDto,
            users_dtos::UserIdResponseDto,
            users_dtos::MessageResponseDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            ApiResponse<users_dtos::UserIdResponseDto>,
            ApiResponse<users_dtos::MessageResponseDto>,
            // Documents
            documents_dtos::UploadDocumentDto,
            documents_dtos::DocumentResponseDto,
            documents_dtos::UploadResponseDto,
            documents_dtos::DeleteDocumentResponseDto,
            ApiResponse<documents_dtos::UploadResponseDto>,
            ApiResponse<Vec<documents_dtos::DocumentResponseDto>>,
            ApiResponse<documents_dtos::DeleteDocumentResponseDto>,
        )
    ),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "auth", description = "Credential login"),
        (name = "users", description = "User account management"),
        (name = "documents", description = "Versioned document upload, download and deletion"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "DocuDefense API",
        version = "0.1.0",
        description = "API documentation for DocuDefense",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Overrides the OpenAPI info block with configured values
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/health",
            "/login",
            "/users",
            "/users/email",
            "/users/{id}",
            "/api/users/search",
            "/users/{id}/upload",
            "/users/{id}/files",
            "/users/{id}/files/{filename}",
        ] {
            assert!(paths.contains(&expected), "missing path {}", expected);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Contracts".to_string(),
            version: "9.9.9".to_string(),
            description: "internal".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Contracts");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("internal"));
    }
}
