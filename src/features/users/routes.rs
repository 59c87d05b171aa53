use crate::features::users::handlers;
use crate::features::users::services::UserService;
use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

/// Public user routes (no authentication required)
pub fn public_routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/users/email", get(handlers::get_user_by_email))
        .route("/api/users/search", get(handlers::search_users))
        .with_state(service)
}

/// Owner-only user routes (require JWT authentication)
pub fn protected_routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route(
            "/users/{id}",
            put(handlers::update_user).delete(handlers::delete_user),
        )
        .with_state(service)
}
