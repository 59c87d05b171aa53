use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{
    CreateUserDto, EmailQuery, MessageResponseDto, SearchUsersQuery, UpdateUserDto,
    UserIdResponseDto, UserResponseDto,
};
use crate::features::users::services::UserService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};
use crate::shared::validation::parse_user_id;

/// List users
#[utoipa::path(
    get,
    path = "/users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of users", body = ApiResponse<Vec<UserResponseDto>>)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(service): State<Arc<UserService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (users, total) = service.list(&pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(users),
        None,
        Some(Meta { total }),
    )))
}

/// Create a user
///
/// The password is stored as a bcrypt hash and never returned.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Invalid user data"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(user), None, None)),
    ))
}

/// Look up a user id by email
#[utoipa::path(
    get,
    path = "/users/email",
    params(EmailQuery),
    responses(
        (status = 200, description = "User id", body = ApiResponse<UserIdResponseDto>),
        (status = 400, description = "Email is required"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user_by_email(
    State(service): State<Arc<UserService>>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<ApiResponse<UserIdResponseDto>>> {
    let email = query
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?;

    let response = service.find_id_by_email(email.trim()).await?;
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Update a user
///
/// Only the account owner may update it. Omitted fields are left unchanged.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Invalid user ID or data"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let id = parse_user_id(&id)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = service.update(id, &user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(updated),
        Some("User updated".to_string()),
        None,
    )))
}

/// Delete a user
///
/// Only the account owner may delete it. All of the user's documents are removed.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<MessageResponseDto>),
        (status = 400, description = "Invalid user ID"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponseDto>>> {
    let id = parse_user_id(&id)?;
    service.delete(id, &user).await?;

    Ok(Json(ApiResponse::success(
        Some(MessageResponseDto {
            message: "User deleted".to_string(),
        }),
        Some("User deleted".to_string()),
        None,
    )))
}

/// Search users by first name or surname
#[utoipa::path(
    get,
    path = "/api/users/search",
    params(SearchUsersQuery),
    responses(
        (status = 200, description = "Matching users", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 400, description = "Search term is required")
    ),
    tag = "users"
)]
pub async fn search_users(
    State(service): State<Arc<UserService>>,
    Query(query): Query<SearchUsersQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let term = query
        .term
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Search term is required".to_string()))?;

    let (users, total) = service.search(term, &query.pagination()).await?;
    Ok(Json(ApiResponse::success(
        Some(users),
        None,
        Some(Meta { total }),
    )))
}
