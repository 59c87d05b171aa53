//! Fixtures shared by the unit and HTTP test suites.

use axum_test::TestServer;
use chrono::Utc;
use fake::faker::internet::en::{Password, SafeEmail};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

use crate::app::{api_router, with_http_layers, Services};
use crate::core::config::{AppConfig, AuthConfig};
use crate::features::documents::repositories::MemoryDocumentRepository;
use crate::features::users::dtos::CreateUserDto;
use crate::features::users::models::User;
use crate::features::users::repositories::MemoryUserRepository;
use crate::modules::storage::LocalStorage;

/// Lowest cost bcrypt accepts; keeps hashing fast in tests
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-key-that-is-long-enough-123".to_string(),
        jwt_expiration: Duration::from_secs(3600),
        jwt_leeway: Duration::ZERO,
        bcrypt_cost: TEST_BCRYPT_COST,
    }
}

pub fn test_app_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        max_request_body_size: 10 * 1024 * 1024,
    }
}

pub fn sample_user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        first_name: "Alice".to_string(),
        surname: "Smith".to_string(),
        email: email.to_string(),
        birthdate: "1995-05-05".to_string(),
        password_hash: "not-a-real-hash".to_string(),
        file_names: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

pub fn create_user_dto(email: &str) -> CreateUserDto {
    CreateUserDto {
        first_name: "Alice".to_string(),
        surname: "Smith".to_string(),
        email: email.to_string(),
        birthdate: "1995-05-05".to_string(),
        password: "alicePassword789".to_string(),
    }
}

/// A registered account with a valid bearer token
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// The full HTTP stack over in-memory repositories and a temporary upload root
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<LocalStorage>,
    _upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(upload_dir.path()));
        let services = Services::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryDocumentRepository::new()),
            Arc::clone(&storage),
            &test_auth_config(),
        );

        let app = with_http_layers(api_router(&services), &test_app_config());

        Self {
            server: TestServer::new(app).unwrap(),
            storage,
            _upload_dir: upload_dir,
        }
    }

    /// Random but valid user creation payload
    pub fn fake_user_payload() -> Value {
        let first_name: String = FirstName().fake();
        let surname: String = LastName().fake();
        let email: String = SafeEmail().fake();
        let password: String = Password(12..20).fake();

        json!({
            "first_name": first_name,
            "surname": surname,
            // Prefix keeps generated addresses unique within one app
            "email": format!("{}.{}", Uuid::new_v4().simple(), email),
            "birthdate": "1990-01-01",
            "password": password,
        })
    }

    pub async fn create_user(&self, payload: &Value) -> Value {
        let response = self.server.post("/users").json(payload).await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .server
            .post("/login")
            .json(&json!({ "email": email, "password": password }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["data"]["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Create a fresh user and log them in
    pub async fn signed_in_user(&self) -> TestUser {
        let payload = Self::fake_user_payload();
        let created = self.create_user(&payload).await;
        let email = payload["email"].as_str().unwrap().to_string();
        let password = payload["password"].as_str().unwrap().to_string();
        let token = self.login(&email, &password).await;

        TestUser {
            id: created["id"].as_str().unwrap().to_string(),
            email,
            token,
        }
    }
}
