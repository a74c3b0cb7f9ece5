//! Test helpers for HTTP API tests.
//!
//! Builds the full router over an in-memory database and wraps it in an
//! `axum_test::TestServer`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};

use gameshelf::auth::Argon2Hasher;
use gameshelf::config::Config;
use gameshelf::web::{create_router, AppState};
use gameshelf::Database;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "Adm1n!pass";
pub const USER_PASSWORD: &str = "Secur3!pass";

/// Configuration used by the tests: a fixed secret and a generous rate limit.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = "test-secret-key-for-testing-only".to_string();
    config.rate_limit.max_requests = 1000;
    config
}

/// Router, test server and the state behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
}

/// Create a test app with the default test configuration.
pub async fn test_app() -> TestApp {
    test_app_with(test_config()).await
}

/// Create a test app with an in-memory database and `config`.
pub async fn test_app_with(config: Config) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    // Cheap hashing parameters keep the tests fast
    let hasher = Argon2Hasher::with_params(1024, 1, 1).expect("valid argon2 params");
    let state = Arc::new(AppState::new(&db, &config, hasher));

    let router = create_router(state.clone(), &config.server.cors_origins);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, state }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

impl TestApp {
    pub async fn register(&self, name: &str, email: &str, password: &str) -> TestResponse {
        self.server
            .post("/api/auth/register")
            .json(&json!({
                "name": name,
                "email": email,
                "password": password
            }))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.server
            .post("/api/auth/login")
            .json(&json!({
                "email": email,
                "password": password
            }))
            .await
    }

    /// Register a standard account. Returns `(account id, token)`.
    pub async fn register_user(&self, name: &str, email: &str) -> (String, String) {
        let response = self.register(name, email, USER_PASSWORD).await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        (
            body["data"]["account"]["id"]
                .as_str()
                .expect("account id")
                .to_string(),
            body["data"]["token"].as_str().expect("token").to_string(),
        )
    }

    /// Bootstrap the administrator and log in. Returns `(account id, token)`.
    pub async fn admin(&self) -> (String, String) {
        let admin = self
            .state
            .accounts
            .ensure_admin("Admin", ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("Failed to create admin");

        let response = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        response.assert_status_ok();
        let body: Value = response.json();
        (
            admin.id.to_string(),
            body["data"]["token"].as_str().expect("token").to_string(),
        )
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> TestResponse {
        self.server
            .get(path)
            .add_header(AUTHORIZATION, bearer(token))
            .await
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.server
            .post(path)
            .add_header(AUTHORIZATION, bearer(token))
            .json(&body)
            .await
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.server
            .put(path)
            .add_header(AUTHORIZATION, bearer(token))
            .json(&body)
            .await
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> TestResponse {
        self.server
            .delete(path)
            .add_header(AUTHORIZATION, bearer(token))
            .await
    }
}
