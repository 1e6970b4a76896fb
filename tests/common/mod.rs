//! Common test utilities and helpers
//!
//! Every integration test runs the full router against the in-memory store,
//! with a push sender that records instead of sending.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use swapin::backend::auth::{create_token, Identity, JwtIdentityVerifier};
use swapin::backend::notifications::push::{PushError, PushMessage, PushSender};
use swapin::backend::notifications::NotificationDispatcher;
use swapin::backend::ratelimit::{MemoryRateLimiter, RateLimitConfig};
use swapin::backend::routes::create_router;
use swapin::backend::server::{AppState, ServerConfig};
use swapin::backend::store::{DocumentStore, MemoryStore};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Push sender that keeps every message it was asked to send
#[derive(Default)]
pub struct RecordingPush {
    pub sent: Mutex<Vec<PushMessage>>,
}

#[async_trait]
impl PushSender for RecordingPush {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub pushes: Arc<RecordingPush>,
}

impl TestApp {
    /// App with a limit high enough that no test trips it by accident
    pub fn new() -> Self {
        Self::with_rate_limit(10_000)
    }

    pub fn with_rate_limit(per_minute: u32) -> Self {
        let config = ServerConfig::builder()
            .jwt_secret(TEST_SECRET)
            .rate_limit_per_minute(per_minute)
            .build()
            .unwrap();

        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let pushes = Arc::new(RecordingPush::default());
        let state = AppState {
            notifier: NotificationDispatcher::new(store.clone(), pushes.clone()),
            identity: Arc::new(JwtIdentityVerifier::new(TEST_SECRET)),
            rate_limiter: Arc::new(MemoryRateLimiter::new(RateLimitConfig::per_minute(per_minute))),
            store,
            config: Arc::new(config),
        };

        let server = TestServer::new(create_router(state.clone())).unwrap();
        Self {
            server,
            state,
            pushes,
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.state.store.as_ref()
    }

    pub async fn post(&self, uid: &str, operation: &str, body: Value) -> TestResponse {
        self.server
            .post(&format!("/api/{operation}"))
            .authorization_bearer(token(uid))
            .json(&body)
            .await
    }

    pub async fn get(&self, uid: &str, operation: &str, params: &[(&str, &str)]) -> TestResponse {
        let mut request = self
            .server
            .get(&format!("/api/{operation}"))
            .authorization_bearer(token(uid));
        for (key, value) in params {
            request = request.add_query_param(key, value);
        }
        request.await
    }

    /// List an item for `uid` and return its id
    pub async fn list_item(&self, uid: &str, title: &str, price: f64) -> String {
        let response = self
            .post(
                uid,
                "listItem",
                json!({
                    "title": title,
                    "description": format!("A well kept {title}"),
                    "category": "sports",
                    "price": price,
                    "condition": "good",
                    "tags": ["outdoor"]
                }),
            )
            .await;
        response.assert_status_ok();
        response.json::<Value>()["id"].as_str().unwrap().to_string()
    }

    /// Create a profile for `uid`, optionally with a push token
    pub async fn create_profile(&self, uid: &str, fcm_token: Option<&str>) {
        let mut body = json!({ "displayName": format!("User {uid}") });
        if let Some(token) = fcm_token {
            body["fcmToken"] = json!(token);
        }
        self.post(uid, "createUserProfile", body).await.assert_status_ok();
    }

    /// Propose a swap of `offered` (owned by `from`) for `requested`
    pub async fn propose(&self, from: &str, offered: &str, requested: &str) -> String {
        let response = self
            .post(
                from,
                "proposeSwap",
                json!({
                    "itemOfferedId": offered,
                    "itemRequestedId": requested,
                    "message": "Fancy a trade?"
                }),
            )
            .await;
        response.assert_status_ok();
        response.json::<Value>()["id"].as_str().unwrap().to_string()
    }

    pub async fn item(&self, id: &str) -> Value {
        let response = self.get("viewer", "getItem", &[("id", id)]).await;
        response.assert_status_ok();
        response.json()
    }
}

pub fn token(uid: &str) -> String {
    let identity = Identity {
        uid: uid.to_string(),
        email: Some(format!("{uid}@example.com")),
        name: Some(format!("User {uid}")),
        picture: None,
    };
    create_token(&identity, TEST_SECRET, 3600).unwrap()
}

/// Assert the error envelope's status and code
pub fn assert_error(response: &TestResponse, status: u16, code: &str) {
    assert_eq!(response.status_code().as_u16(), status, "body: {}", response.text());
    let body: Value = response.json();
    assert_eq!(body["code"], json!(code));
    assert!(body["error"].is_string());
    assert!(body["timestamp"].is_string());
}
