use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, LoginResponseDto};
use crate::features::auth::password::verify_password;
use crate::features::auth::services::token_service::TokenService;
use crate::features::users::repositories::UserRepository;
use std::sync::Arc;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Service for credential login
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, token_service: Arc<TokenService>) -> Self {
        Self {
            users,
            token_service,
        }
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password produce the same 401.
    pub async fn login(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        let user = self
            .users
            .find_by_email(dto.email.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&dto.password, &user.password_hash).await? {
            tracing::info!("Failed login attempt for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let issued = self.token_service.issue(&user)?;
        tracing::info!("User {} logged in", user.id);

        Ok(LoginResponseDto {
            message: "Login successful".to_string(),
            token: issued.access_token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            user: user.into(),
        })
    }
}
