use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::password::hash_password;
use crate::features::users::dtos::{
    CreateUserDto, UpdateUserDto, UserIdResponseDto, UserResponseDto,
};
use crate::features::users::models::{NewUser, User, UserChanges};
use crate::features::users::repositories::UserRepository;
use crate::modules::storage::LocalStorage;
use crate::shared::types::PaginationQuery;

/// Service for user account operations
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    storage: Arc<LocalStorage>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        storage: Arc<LocalStorage>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            repository,
            storage,
            bcrypt_cost,
        }
    }

    /// List users page by page, returning the page and the total count
    pub async fn list(&self, pagination: &PaginationQuery) -> Result<(Vec<UserResponseDto>, i64)> {
        let users = self
            .repository
            .list(pagination.offset(), pagination.limit())
            .await?;
        let total = self.repository.count().await?;

        Ok((users.into_iter().map(Into::into).collect(), total))
    }

    pub async fn create(&self, dto: CreateUserDto) -> Result<UserResponseDto> {
        let password_hash = hash_password(&dto.password, self.bcrypt_cost).await?;

        let user = self
            .repository
            .create(NewUser {
                first_name: dto.first_name,
                surname: dto.surname,
                email: dto.email,
                birthdate: dto.birthdate,
                password_hash,
            })
            .await?;

        info!("User created: id={}", user.id);
        Ok(user.into())
    }

    pub async fn find_id_by_email(&self, email: &str) -> Result<UserIdResponseDto> {
        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(UserIdResponseDto { id: user.id })
    }

    pub async fn search(
        &self,
        term: &str,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<UserResponseDto>, i64)> {
        let users = self
            .repository
            .search(term, pagination.offset(), pagination.limit())
            .await?;
        let total = self.repository.count_search(term).await?;

        Ok((users.into_iter().map(Into::into).collect(), total))
    }

    /// Load the user and check that the requester owns the account.
    ///
    /// `action` completes the sentence "You are not authorized to ... this account".
    pub async fn authorize_owner(
        &self,
        id: Uuid,
        requester: &AuthenticatedUser,
        action: &str,
    ) -> Result<User> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !requester.owns(&user.email) {
            warn!(
                "Unauthorized {} attempt by user {} on account {}",
                action, requester.user_id, id
            );
            return Err(AppError::Forbidden(format!(
                "You are not authorized to {} this account",
                action
            )));
        }

        Ok(user)
    }

    pub async fn update(
        &self,
        id: Uuid,
        requester: &AuthenticatedUser,
        dto: UpdateUserDto,
    ) -> Result<UserResponseDto> {
        self.authorize_owner(id, requester, "update").await?;

        let password_hash = match dto.password.as_deref() {
            Some(password) => Some(hash_password(password, self.bcrypt_cost).await?),
            None => None,
        };

        let changes = UserChanges {
            first_name: dto.first_name,
            surname: dto.surname,
            email: dto.email,
            birthdate: dto.birthdate,
            password_hash,
        };

        let user = self
            .repository
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        info!("User updated: id={}", user.id);
        Ok(user.into())
    }

    /// Delete the account; its documents go with it
    pub async fn delete(&self, id: Uuid, requester: &AuthenticatedUser) -> Result<()> {
        self.authorize_owner(id, requester, "delete").await?;

        if !self.repository.delete(id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        // Rows are gone at this point; a leftover directory is logged, not fatal
        if let Err(e) = self.storage.delete_user_dir(id).await {
            warn!("User {} deleted but files remain on disk: {}", id, e);
        }

        info!("User deleted: id={}", id);
        Ok(())
    }

    /// Remember a filename on the user's record (append-only)
    pub async fn record_file_name(&self, id: Uuid, filename: &str) -> Result<()> {
        self.repository.append_file_name(id, filename).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::password::verify_password;
    use crate::features::users::repositories::MemoryUserRepository;
    use crate::shared::test_helpers::{create_user_dto, TEST_BCRYPT_COST};

    struct Fixture {
        _dir: tempfile::TempDir,
        repository: Arc<MemoryUserRepository>,
        service: UserService,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let repository = Arc::new(MemoryUserRepository::new());
        let storage = Arc::new(LocalStorage::new(dir.path()));
        let service = UserService::new(repository.clone(), storage, TEST_BCRYPT_COST);
        Fixture {
            _dir: dir,
            repository,
            service,
        }
    }

    fn requester(user: &UserResponseDto) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: user.id,
            email: user.email.clone(),
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let f = fixture();
        let created = f
            .service
            .create(create_user_dto("alice.smith@example.com"))
            .await
            .unwrap();

        let stored = f.repository.find_by_id(created.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "alicePassword789");
        assert!(verify_password("alicePassword789", &stored.password_hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_create_duplicate_email_conflicts() {
        let f = fixture();
        f.service
            .create(create_user_dto("dup@example.com"))
            .await
            .unwrap();
        let result = f.service.create(create_user_dto("dup@example.com")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_find_id_by_email() {
        let f = fixture();
        let created = f
            .service
            .create(create_user_dto("lookup@example.com"))
            .await
            .unwrap();

        let found = f
            .service
            .find_id_by_email("lookup@example.com")
            .await
            .unwrap();
        assert_eq!(found.id, created.id);

        assert!(matches!(
            f.service.find_id_by_email("missing@example.com").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_authorize_owner() {
        let f = fixture();
        let alice = f
            .service
            .create(create_user_dto("alice@example.com"))
            .await
            .unwrap();
        let bob = f
            .service
            .create(create_user_dto("bob@example.com"))
            .await
            .unwrap();

        assert!(f
            .service
            .authorize_owner(alice.id, &requester(&alice), "update")
            .await
            .is_ok());

        match f
            .service
            .authorize_owner(alice.id, &requester(&bob), "update")
            .await
        {
            Err(AppError::Forbidden(msg)) => {
                assert_eq!(msg, "You are not authorized to update this account")
            }
            other => panic!("expected forbidden, got {:?}", other),
        }

        assert!(matches!(
            f.service
                .authorize_owner(Uuid::new_v4(), &requester(&alice), "update")
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let f = fixture();
        let alice = f
            .service
            .create(create_user_dto("alice@example.com"))
            .await
            .unwrap();

        let updated = f
            .service
            .update(
                alice.id,
                &requester(&alice),
                UpdateUserDto {
                    first_name: Some("Alicia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Alicia");
        assert_eq!(updated.surname, alice.surname);
        assert_eq!(updated.email, alice.email);

        // Password untouched when not supplied
        let stored = f.repository.find_by_id(alice.id).await.unwrap().unwrap();
        assert!(verify_password("alicePassword789", &stored.password_hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_rehashes_new_password() {
        let f = fixture();
        let alice = f
            .service
            .create(create_user_dto("alice@example.com"))
            .await
            .unwrap();

        f.service
            .update(
                alice.id,
                &requester(&alice),
                UpdateUserDto {
                    password: Some("brandNewPassword1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = f.repository.find_by_id(alice.id).await.unwrap().unwrap();
        assert!(verify_password("brandNewPassword1", &stored.password_hash)
            .await
            .unwrap());
        assert!(!verify_password("alicePassword789", &stored.password_hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_files() {
        let f = fixture();
        let alice = f
            .service
            .create(create_user_dto("alice@example.com"))
            .await
            .unwrap();

        let key = LocalStorage::key_for(alice.id, 1, "a.pdf");
        f.service.storage.write(&key, b"data").await.unwrap();

        f.service.delete(alice.id, &requester(&alice)).await.unwrap();

        assert!(f.repository.find_by_id(alice.id).await.unwrap().is_none());
        assert!(!f
            .service
            .storage
            .root()
            .join(alice.id.to_string())
            .exists());
    }

    #[tokio::test]
    async fn test_record_file_name_is_idempotent() {
        let f = fixture();
        let alice = f
            .service
            .create(create_user_dto("alice@example.com"))
            .await
            .unwrap();

        f.service.record_file_name(alice.id, "a.pdf").await.unwrap();
        f.service.record_file_name(alice.id, "b.pdf").await.unwrap();
        f.service.record_file_name(alice.id, "a.pdf").await.unwrap();

        let stored = f.repository.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.file_names, vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_search_and_list_paginate() {
        let f = fixture();
        for i in 0..3 {
            let mut dto = create_user_dto(&format!("user{}@example.com", i));
            dto.first_name = format!("Alex{}", i);
            f.service.create(dto).await.unwrap();
        }
        let mut other = create_user_dto("zed@example.com");
        other.first_name = "Zed".to_string();
        other.surname = "Quill".to_string();
        f.service.create(other).await.unwrap();

        let (page, total) = f
            .service
            .search("alex", &PaginationQuery { page: 1, limit: 2 })
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);

        let (page, total) = f
            .service
            .list(&PaginationQuery { page: 2, limit: 3 })
            .await
            .unwrap();
        assert_eq!(total, 4);
        assert_eq!(page.len(), 1);
    }
}
