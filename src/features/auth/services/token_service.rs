use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::Claims;
use crate::features::users::models::User;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

/// A freshly signed access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
}

/// Signs HS256 access tokens carrying the user's id and email
pub struct TokenService {
    encoding_key: EncodingKey,
    expiration_secs: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            expiration_secs: config.jwt_expiration.as_secs(),
        }
    }

    pub fn issue(&self, user: &User) -> Result<IssuedToken> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now,
            exp: now + self.expiration_secs,
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

        tracing::debug!(
            "Issued access token for user {}, expires in {} seconds",
            user.id,
            self.expiration_secs
        );

        Ok(IssuedToken {
            access_token,
            expires_in: self.expiration_secs as i64,
        })
    }
}
