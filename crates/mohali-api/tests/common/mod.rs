//! Shared helpers for API integration tests

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use mohali_api::{AppState, create_router};
use mohali_auth::{Gatekeeper, GatekeeperPolicy, JwtManager, hash_password};
use mohali_db::{Database, NewUser, User, UserRole};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

/// A router over a fresh database
pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    _dir: TempDir,
}

/// Captured response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap()
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("api.db").display());
        let db = Database::new(&url).await.unwrap();

        let jwt = Arc::new(JwtManager::new(SECRET, 1).unwrap());
        let gatekeeper = Arc::new(Gatekeeper::new(GatekeeperPolicy::default(), jwt.clone()));
        let router = create_router(AppState::new(db.clone(), jwt.clone(), gatekeeper), None);

        Self {
            router,
            db,
            jwt,
            _dir: dir,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        headers: &[(header::HeaderName, &str)],
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            headers,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Create an account directly in the database
    pub async fn create_user(&self, email: &str, password: &str, role: UserRole) -> User {
        self.db
            .insert_user(NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: hash_password(password).unwrap(),
                role,
                phone: Some("+91 98765 43210".to_string()),
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        self.jwt.generate_token(&user.id, &user.email, user.role).unwrap()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
