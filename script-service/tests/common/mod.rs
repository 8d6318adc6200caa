//! Shared setup for script-service router tests.
//!
//! Builds the real router over the in-memory store and the mock provider, so
//! no MongoDB or network access is needed.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use script_service::config::JwtConfig;
use script_service::services::providers::mock::MockTextProvider;
use script_service::services::{GenerationClient, InMemoryScriptStore, TokenService};
use script_service::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const MOCK_SCRIPT: &str = "INT. LIGHTHOUSE - NIGHT. The keeper waits.";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryScriptStore>,
    pub provider: Arc<MockTextProvider>,
    pub tokens: TokenService,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_provider(MockTextProvider::replying(MOCK_SCRIPT))
    }

    pub fn with_provider(provider: MockTextProvider) -> Self {
        let store = Arc::new(InMemoryScriptStore::new());
        let provider = Arc::new(provider);
        let tokens = TokenService::new(&JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiry_seconds: 3600,
        })
        .expect("Failed to create token service");

        let state = AppState {
            store: store.clone(),
            generator: GenerationClient::new(provider.clone(), 100),
            tokens: tokens.clone(),
        };

        TestApp {
            router: build_router(state),
            store,
            provider,
            tokens,
        }
    }

    pub fn token_for(&self, email: &str) -> String {
        self.tokens
            .issue(serde_json::json!({ "email": email }))
            .expect("Failed to issue token")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("Failed to build request"))
            .await
            .expect("Failed to execute request")
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, bearer).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response was not JSON")
        };
        (status, value)
    }

    /// Create a script through the API and return its id.
    pub async fn create_script(&self, title: &str, email: &str) -> String {
        let (status, body) = self
            .json(
                Method::POST,
                "/scripts",
                Some(serde_json::json!({
                    "title": title,
                    "genre": "Drama",
                    "synopsis": "S",
                    "email": email,
                })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["result"]["insertedId"]
            .as_str()
            .expect("insertedId missing")
            .to_string()
    }
}
