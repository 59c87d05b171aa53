//! In-memory [`UserRepository`] used by the test suites.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::users::models::{NewUser, User, UserChanges};
use crate::features::users::repositories::UserRepository;

#[derive(Debug, Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_term(user: &User, term: &str) -> bool {
    let term = term.to_lowercase();
    user.first_name.to_lowercase().contains(&term) || user.surname.to_lowercase().contains(&term)
}

fn page(users: Vec<User>, offset: i64, limit: i64) -> Vec<User> {
    users
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(
                "Email is already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            surname: user.surname,
            email: user.email,
            birthdate: user.birthdate,
            password_hash: user.password_hash,
            file_names: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(page(users.clone(), offset, limit))
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.users.read().await.len() as i64)
    }

    async fn search(&self, term: &str, offset: i64, limit: i64) -> Result<Vec<User>> {
        let users = self.users.read().await;
        let matching = users
            .iter()
            .filter(|u| matches_term(u, term))
            .cloned()
            .collect();
        Ok(page(matching, offset, limit))
    }

    async fn count_search(&self, term: &str) -> Result<i64> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| matches_term(u, term)).count() as i64)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>> {
        let mut users = self.users.write().await;

        if let Some(email) = &changes.email {
            if users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(AppError::Conflict(
                    "Email is already registered".to_string(),
                ));
            }
        }

        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(first_name) = changes.first_name {
            user.first_name = first_name;
        }
        if let Some(surname) = changes.surname {
            user.surname = surname;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(birthdate) = changes.birthdate {
            user.birthdate = birthdate;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn append_file_name(&self, id: Uuid, filename: &str) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            if !user.file_names.iter().any(|f| f == filename) {
                user.file_names.push(filename.to_string());
            }
        }
        Ok(())
    }
}
