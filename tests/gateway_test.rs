//! Router-level behavior: health check, authentication, method gate,
//! unknown routes and rate limiting.

#![cfg(feature = "ssr")]

mod common;

use axum::http::{header::AUTHORIZATION, HeaderValue};
use common::{assert_error, TestApp};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use swapin::backend::auth::{create_token, Identity};

#[tokio::test]
async fn test_health_needs_no_auth() {
    let app = TestApp::new();
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = TestApp::new();
    let response = app.server.get("/api/getCart").await;
    assert_error(&response, 401, "AUTH_REQUIRED");

    let basic = app
        .server
        .get("/api/getCart")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Basic abc"))
        .await;
    assert_error(&basic, 401, "AUTH_REQUIRED");
}

#[tokio::test]
async fn test_foreign_token_is_rejected() {
    let app = TestApp::new();
    let forged = create_token(&Identity::new("mallory"), "some-other-secret", 3600).unwrap();

    let response = app
        .server
        .get("/api/getCart")
        .authorization_bearer(forged)
        .await;
    assert_error(&response, 401, "INVALID_TOKEN");
}

#[tokio::test]
async fn test_wrong_method_is_answered_before_auth() {
    let app = TestApp::new();

    let response = app.server.get("/api/listItem").await;
    assert_error(&response, 405, "METHOD_NOT_ALLOWED");

    let put = app.server.post("/api/updateDeliveryAddress").json(&json!({})).await;
    assert_error(&put, 405, "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();
    let response = app.server.get("/api/doesNotExist").await;
    assert_error(&response, 404, "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_body_gets_envelope() {
    let app = TestApp::new();
    let response = app
        .server
        .post("/api/listItem")
        .authorization_bearer(common::token("alice"))
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    assert_error(&response, 400, "INVALID_REQUEST");
}

#[tokio::test]
async fn test_rate_limit_per_caller() {
    let app = TestApp::with_rate_limit(60);

    for _ in 0..60 {
        app.get("alice", "getCart", &[]).await.assert_status_ok();
    }
    let limited = app.get("alice", "getCart", &[]).await;
    assert_error(&limited, 429, "RATE_LIMIT");

    // Other callers have their own window
    app.get("bob", "getCart", &[]).await.assert_status_ok();
}
