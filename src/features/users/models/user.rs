use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for users
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub birthdate: String,
    pub password_hash: String,
    /// Every distinct filename the user has uploaded; entries are never removed
    pub file_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub birthdate: String,
    pub password_hash: String,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub birthdate: Option<String>,
    pub password_hash: Option<String>,
}
