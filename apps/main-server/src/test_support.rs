//! Helpers for driving the router in tests.

use std::sync::Arc;

use auth::{JwtConfig, JwtManager, MemoryRevocationStore};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use doc_store::MemoryStore;
use entities::UserId;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::config::Config;
use crate::create_app;
use crate::services::blob_store::MemoryBlobStore;
use crate::state::AppState;

const TEST_SECRET: &str = "test-secret-key-must-be-long-enough-for-security";

pub struct TestApp {
    pub state: Arc<AppState<MemoryStore>>,
    pub blobs: Arc<MemoryBlobStore>,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = Config::with_secret(TEST_SECRET);
        let jwt_manager = JwtManager::new(JwtConfig::new(TEST_SECRET));
        let blobs = Arc::new(MemoryBlobStore::new());

        let state = Arc::new(AppState::new(
            config,
            MemoryStore::new(),
            jwt_manager,
            Box::new(MemoryRevocationStore::new()),
            blobs.clone(),
        ));
        let router = create_app(state.clone());

        Self {
            state,
            blobs,
            router,
        }
    }

    /// Mints a token for a fresh identity without creating a profile.
    pub fn token(&self, email: &str, name: Option<&str>) -> (UserId, String) {
        let id = Uuid::new_v4();
        let token = self
            .state
            .jwt_manager
            .generate_token(id, email.to_string(), name.map(str::to_string))
            .unwrap();
        (id, token)
    }

    /// Mints a token and signs the user in so that the profile exists.
    pub async fn token_for_new_user(&self, email: &str, name: Option<&str>) -> String {
        self.user(email, name).await.1
    }

    /// Like [`TestApp::token_for_new_user`], also returning the user id.
    pub async fn user(&self, email: &str, name: Option<&str>) -> (UserId, String) {
        let (id, token) = self.token(email, name);
        let (status, body) = self
            .post("/api/auth/session", &token, serde_json::json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["created"], true);
        (id, token)
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if !token.is_empty() {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.send(request).await
    }

    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if !token.is_empty() {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }
}
