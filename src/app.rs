//! Router assembly shared by the binary and the HTTP test suites.

use axum::{extract::DefaultBodyLimit, http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::core::config::{AppConfig, AuthConfig};
use crate::core::middleware;
use crate::features::auth::{routes as auth_routes, AuthService, JwtValidator, TokenService};
use crate::features::documents::repositories::DocumentRepository;
use crate::features::documents::{routes as documents_routes, DocumentService};
use crate::features::users::repositories::UserRepository;
use crate::features::users::{routes as users_routes, UserService};
use crate::modules::storage::LocalStorage;

/// Long-lived services handed to the routers as state
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UserService>,
    pub auth: Arc<AuthService>,
    pub documents: Arc<DocumentService>,
    pub jwt_validator: Arc<JwtValidator>,
}

impl Services {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        document_repository: Arc<dyn DocumentRepository>,
        storage: Arc<LocalStorage>,
        auth: &AuthConfig,
    ) -> Self {
        let users = Arc::new(UserService::new(
            Arc::clone(&user_repository),
            Arc::clone(&storage),
            auth.bcrypt_cost,
        ));
        let token_service = Arc::new(TokenService::new(auth));
        let auth_service = Arc::new(AuthService::new(user_repository, token_service));
        let documents = Arc::new(DocumentService::new(
            document_repository,
            Arc::clone(&users),
            storage,
        ));
        let jwt_validator = Arc::new(JwtValidator::new(&auth.jwt_secret, auth.jwt_leeway));

        Self {
            users,
            auth: auth_service,
            documents,
            jwt_validator,
        }
    }
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up")
    ),
    tag = "health"
)]
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Every API route, with JWT authentication on the protected ones
pub fn api_router(services: &Services) -> Router {
    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(users_routes::protected_routes(Arc::clone(&services.users)))
        .merge(documents_routes::routes(Arc::clone(&services.documents)))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&services.jwt_validator),
            middleware::auth_middleware,
        ));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(Arc::clone(&services.auth)))
        .merge(users_routes::public_routes(Arc::clone(&services.users)))
        .route("/health", get(health_check));

    Router::new().merge(protected_routes).merge(public_routes)
}

/// Outer HTTP layers: body limit, CORS, request ids and tracing
pub fn with_http_layers(router: Router, config: &AppConfig) -> Router {
    router
        .layer(DefaultBodyLimit::max(config.max_request_body_size))
        .layer(middleware::cors_layer(&config.cors_allowed_origins))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}
