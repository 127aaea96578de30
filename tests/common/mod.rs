//! Shared helpers for integration tests
//!
//! Every test app runs on its own in-memory store, so tests need no database
//! and never see each other's data.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use board_api::{
    config::{
        AppConfig, CorsConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig,
    },
    middleware::AppState,
    repository::{MemoryStore, Repositories},
    routes,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
            max_body_bytes: 64 * 1024,
        },
        database: DatabaseConfig {
            url: Secret::new("memory://test".to_string()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(TEST_SECRET.to_string()),
            access_token_validity_secs: 300,
            refresh_token_validity_secs: 3600,
            // cheap Argon2 parameters keep signup/login fast
            password_hash_memory_kib: 1024,
            password_hash_iterations: 1,
            password_hash_parallelism: 1,
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            max_age_secs: 600,
        },
    }
}

/// Router plus direct handles on its state and store
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
}

pub fn create_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let repos = Repositories::from_store(store.clone());
    let state = Arc::new(
        AppState::new(create_test_config(), repos, None).expect("Failed to build test state"),
    );

    TestApp {
        router: routes::create_router(state.clone()),
        state,
        store,
    }
}

impl TestApp {
    /// Send one request; the body is parsed as JSON when possible, else kept as a string
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, body)
    }

    pub async fn signup(&self, email: &str, username: &str, password: &str) -> Uuid {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({
                    "email": email,
                    "username": username,
                    "password": password,
                    "pwdConfirm": password,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
        body.as_str().unwrap().parse().unwrap()
    }

    /// Returns (access token, refresh token)
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        (
            body["accessToken"].as_str().unwrap().to_string(),
            body["refreshToken"].as_str().unwrap().to_string(),
        )
    }

    /// Sign up then log in; returns (account id, access token)
    pub async fn register(&self, email: &str, username: &str) -> (Uuid, String) {
        let id = self.signup(email, username, "secret1").await;
        let (access, _) = self.login(email, "secret1").await;
        (id, access)
    }

    pub async fn create_post(&self, token: &str, title: &str, content: &str) -> Uuid {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/posts",
                Some(token),
                Some(json!({ "title": title, "content": content })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "create post failed: {}", body);
        body.as_str().unwrap().parse().unwrap()
    }
}
