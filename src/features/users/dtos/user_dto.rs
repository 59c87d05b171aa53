use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::User;
use crate::shared::types::PaginationQuery;

/// Request DTO for creating a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 128, message = "First name must be 1-128 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 128, message = "Surname must be 1-128 characters"))]
    pub surname: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[schema(example = "1995-05-05")]
    #[validate(length(max = 32, message = "Birthdate must not exceed 32 characters"))]
    pub birthdate: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request DTO for updating a user; omitted fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 128, message = "First name must be 1-128 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 128, message = "Surname must be 1-128 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[validate(length(max = 32, message = "Birthdate must not exceed 32 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Public view of a user. The password hash is never part of it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub birthdate: String,
    pub file_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            surname: user.surname,
            email: user.email,
            birthdate: user.birthdate,
            file_names: user.file_names,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Response for the email lookup endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserIdResponseDto {
    pub id: Uuid,
}

/// Generic confirmation payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponseDto {
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmailQuery {
    /// Email address to look up
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchUsersQuery {
    /// Case-insensitive fragment of the first name or surname
    pub term: Option<String>,

    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    PaginationQuery::default().page
}

fn default_limit() -> i64 {
    PaginationQuery::default().limit
}

impl SearchUsersQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn valid_create() -> CreateUserDto {
        CreateUserDto {
            first_name: "Alice".to_string(),
            surname: "Smith".to_string(),
            email: "alice.smith@example.com".to_string(),
            birthdate: "1995-05-05".to_string(),
            password: "alicePassword789".to_string(),
        }
    }

    #[test]
    fn test_create_dto_valid() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn test_create_dto_rejects_bad_email_and_short_password() {
        let mut dto = valid_create();
        dto.email = "not-an-email".to_string();
        assert!(dto.validate().is_err());

        let mut dto = valid_create();
        dto.password = "short".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_dto_birthdate_optional() {
        let dto: CreateUserDto = serde_json::from_str(
            r#"{"first_name":"Bob","surname":"Jones","email":"bob@example.com","password":"bobPassword1"}"#,
        )
        .unwrap();
        assert_eq!(dto.birthdate, "");
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_dto_empty_is_valid() {
        assert!(UpdateUserDto::default().validate().is_ok());
    }

    #[test]
    fn test_update_dto_validates_present_fields() {
        let dto = UpdateUserDto {
            password: Some("short".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_response_has_no_password() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Alice".to_string(),
            surname: "Smith".to_string(),
            email: "alice.smith@example.com".to_string(),
            birthdate: String::new(),
            password_hash: "$2b$04$hash".to_string(),
            file_names: vec![],
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UserResponseDto::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "alice.smith@example.com");
    }
}
