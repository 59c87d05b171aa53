use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::core::database::{is_unique_violation, with_timeout};
use crate::core::error::{AppError, Result};
use crate::features::users::models::{NewUser, User, UserChanges};
use crate::shared::validation::escape_like;

/// Persistence for user records
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is taken
    async fn create(&self, user: NewUser) -> Result<User>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>>;

    async fn count(&self) -> Result<i64>;

    /// Case-insensitive substring match on first name or surname
    async fn search(&self, term: &str, offset: i64, limit: i64) -> Result<Vec<User>>;

    async fn count_search(&self, term: &str) -> Result<i64>;

    /// Returns `None` when no row has this id; `Conflict` when the new email is taken
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>>;

    /// Returns whether a row was deleted
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Adds `filename` to the user's file list unless already present
    async fn append_file_name(&self, id: Uuid, filename: &str) -> Result<()>;
}

/// PostgreSQL-backed [`UserRepository`]
pub struct PgUserRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgUserRepository {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

fn email_conflict<T>(result: Result<T>) -> Result<T> {
    match result {
        Err(AppError::Database(ref e)) if is_unique_violation(e) => Err(AppError::Conflict(
            "Email is already registered".to_string(),
        )),
        other => other,
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let result = with_timeout(
            self.query_timeout,
            "insert user",
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (id, first_name, surname, email, birthdate, password_hash)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&user.first_name)
            .bind(&user.surname)
            .bind(&user.email)
            .bind(&user.birthdate)
            .bind(&user.password_hash)
            .fetch_one(&self.pool),
        )
        .await;

        email_conflict(result)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        with_timeout(
            self.query_timeout,
            "find user by id",
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        with_timeout(
            self.query_timeout,
            "find user by email",
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>> {
        with_timeout(
            self.query_timeout,
            "list users",
            sqlx::query_as::<_, User>(
                "SELECT * FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn count(&self) -> Result<i64> {
        with_timeout(
            self.query_timeout,
            "count users",
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&self.pool),
        )
        .await
    }

    async fn search(&self, term: &str, offset: i64, limit: i64) -> Result<Vec<User>> {
        let pattern = format!("%{}%", escape_like(term));
        with_timeout(
            self.query_timeout,
            "search users",
            sqlx::query_as::<_, User>(
                r#"
                SELECT * FROM users
                WHERE first_name ILIKE $1 ESCAPE '\' OR surname ILIKE $1 ESCAPE '\'
                ORDER BY created_at, id
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn count_search(&self, term: &str) -> Result<i64> {
        let pattern = format!("%{}%", escape_like(term));
        with_timeout(
            self.query_timeout,
            "count user search",
            sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*) FROM users
                WHERE first_name ILIKE $1 ESCAPE '\' OR surname ILIKE $1 ESCAPE '\'
                "#,
            )
            .bind(pattern)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>> {
        let result = with_timeout(
            self.query_timeout,
            "update user",
            sqlx::query_as::<_, User>(
                r#"
                UPDATE users
                SET first_name = COALESCE($2, first_name),
                    surname = COALESCE($3, surname),
                    email = COALESCE($4, email),
                    birthdate = COALESCE($5, birthdate),
                    password_hash = COALESCE($6, password_hash),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.surname)
            .bind(changes.email)
            .bind(changes.birthdate)
            .bind(changes.password_hash)
            .fetch_optional(&self.pool),
        )
        .await;

        email_conflict(result)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = with_timeout(
            self.query_timeout,
            "delete user",
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_file_name(&self, id: Uuid, filename: &str) -> Result<()> {
        with_timeout(
            self.query_timeout,
            "append user file name",
            sqlx::query(
                r#"
                UPDATE users
                SET file_names = array_append(file_names, $2), updated_at = NOW()
                WHERE id = $1 AND NOT ($2 = ANY(file_names))
                "#,
            )
            .bind(id)
            .bind(filename)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }
}
