use super::model::{AuthenticatedUser, Claims};
use crate::core::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::time::Duration;
use uuid::Uuid;

/// Verifies HS256 bearer tokens issued by [`TokenService`](super::services::TokenService)
pub struct JwtValidator {
    decoding_key: DecodingKey,
    leeway: u64,
}

impl JwtValidator {
    pub fn new(secret: &str, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        // Only HS256 is accepted; any other algorithm in the header fails validation
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        let claims = token_data.claims;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-key-that-is-long-enough-123";

    fn now() -> u64 {
        chrono::Utc::now().timestamp() as u64
    }

    fn sign(claims: &Claims, algorithm: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(exp: u64) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "alice.smith@example.com".to_string(),
            iat: now(),
            exp,
        }
    }

    #[test]
    fn test_valid_token() {
        let validator = JwtValidator::new(SECRET, Duration::ZERO);
        let claims = claims(now() + 3600);
        let token = sign(&claims, Algorithm::HS256, SECRET);

        let user = validator.validate_token(&token).unwrap();
        assert_eq!(user.email, "alice.smith@example.com");
        assert_eq!(user.user_id.to_string(), claims.sub);
    }

    #[test]
    fn test_expired_token_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::ZERO);
        let token = sign(&claims(now() - 120), Algorithm::HS256, SECRET);

        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_leeway_tolerates_recent_expiry() {
        let validator = JwtValidator::new(SECRET, Duration::from_secs(300));
        let token = sign(&claims(now() - 60), Algorithm::HS256, SECRET);

        assert!(validator.validate_token(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::ZERO);
        let token = sign(
            &claims(now() + 3600),
            Algorithm::HS256,
            "another-secret-key-that-is-long-enough",
        );

        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn test_other_hmac_algorithm_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::ZERO);
        let token = sign(&claims(now() + 3600), Algorithm::HS512, SECRET);

        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::ZERO);
        let mut claims = claims(now() + 3600);
        claims.sub = "not-a-uuid".to_string();
        let token = sign(&claims, Algorithm::HS256, SECRET);

        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::ZERO);
        assert!(validator.validate_token("not.a.token").is_err());
        assert!(validator.validate_token("").is_err());
    }
}
