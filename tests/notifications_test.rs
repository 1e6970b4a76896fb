//! Notification API integration tests

#![cfg(feature = "ssr")]

mod common;

use common::{assert_error, TestApp};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

async fn send(app: &TestApp, from: &str, to: &str, title: &str) -> String {
    let response = app
        .post(
            from,
            "sendNotification",
            json!({ "userId": to, "type": "custom", "title": title, "message": "hello" }),
        )
        .await;
    response.assert_status_ok();
    response.json::<Value>()["notificationId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_mark_all_read_counts_only_unread() {
    let app = TestApp::new();
    let mut ids = Vec::new();
    for n in 0..7 {
        ids.push(send(&app, "alice", "bob", &format!("Note {n}")).await);
    }
    for id in &ids[..2] {
        app.post("bob", "markNotificationRead", json!({ "notificationId": id }))
            .await
            .assert_status_ok();
    }

    let inbox: Value = app.get("bob", "getNotifications", &[]).await.json();
    assert_eq!(inbox["unreadCount"], json!(5));

    let marked: Value = app.post("bob", "markAllNotificationsRead", json!({})).await.json();
    assert_eq!(marked["updated"], json!(5));

    let inbox: Value = app.get("bob", "getNotifications", &[]).await.json();
    assert_eq!(inbox["unreadCount"], json!(0));
    assert_eq!(inbox["notifications"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_notifications_are_paginated() {
    let app = TestApp::new();
    for n in 0..7 {
        send(&app, "alice", "bob", &format!("Note {n}")).await;
    }

    let page: Value = app
        .get("bob", "getNotifications", &[("page", "2"), ("limit", "3")])
        .await
        .json();
    assert_eq!(page["notifications"].as_array().unwrap().len(), 3);
    assert_eq!(page["pagination"], json!({ "page": 2, "limit": 3 }));
    assert_eq!(page["unreadCount"], json!(7));

    let last: Value = app
        .get("bob", "getNotifications", &[("page", "3"), ("limit", "3")])
        .await
        .json();
    assert_eq!(last["notifications"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let app = TestApp::new();
    send(&app, "alice", "bob", "Only one").await;

    let response = app
        .get("bob", "getNotifications", &[("page", "18446744073709551615"), ("limit", "100")])
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["notifications"].as_array().unwrap().is_empty());
    assert_eq!(body["unreadCount"], json!(1));
}

#[tokio::test]
async fn test_unread_only_filter() {
    let app = TestApp::new();
    let first = send(&app, "alice", "bob", "First").await;
    send(&app, "alice", "bob", "Second").await;
    app.post("bob", "markNotificationRead", json!({ "notificationId": first }))
        .await
        .assert_status_ok();

    let unread: Value = app
        .get("bob", "getNotifications", &[("unreadOnly", "true")])
        .await
        .json();
    let notifications = unread["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["title"], json!("Second"));
    assert_eq!(notifications[0]["isRead"], json!(false));
}

#[tokio::test]
async fn test_inboxes_are_private() {
    let app = TestApp::new();
    let id = send(&app, "alice", "bob", "For Bob").await;

    let response = app
        .post("carol", "markNotificationRead", json!({ "notificationId": id }))
        .await;
    assert_error(&response, 404, "NOTIFICATION_NOT_FOUND");

    let inbox: Value = app.get("carol", "getNotifications", &[]).await.json();
    assert!(inbox["notifications"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_custom_data_is_stored() {
    let app = TestApp::new();
    app.post(
        "alice",
        "sendNotification",
        json!({ "userId": "bob", "title": "Offer", "data": { "offerId": "o-1" } }),
    )
    .await
    .assert_status_ok();

    let inbox: Value = app.get("bob", "getNotifications", &[]).await.json();
    assert_eq!(inbox["notifications"][0]["data"], json!({ "offerId": "o-1" }));
}

#[tokio::test]
async fn test_send_notification_requires_recipient_and_title() {
    let app = TestApp::new();

    let no_recipient = app
        .post("alice", "sendNotification", json!({ "title": "Hi" }))
        .await;
    assert_error(&no_recipient, 400, "MISSING_FIELDS");

    let no_title = app
        .post("alice", "sendNotification", json!({ "toUserId": "bob" }))
        .await;
    assert_error(&no_title, 400, "MISSING_FIELDS");
}

#[tokio::test]
async fn test_fcm_token_enables_push() {
    let app = TestApp::new();

    let without_profile = app
        .post("bob", "updateFCMToken", json!({ "fcmToken": "bob-device" }))
        .await;
    assert_error(&without_profile, 404, "USER_NOT_FOUND");

    app.create_profile("bob", None).await;
    send(&app, "alice", "bob", "Before token").await;
    assert!(app.pushes.sent.lock().await.is_empty());

    app.post("bob", "updateFCMToken", json!({ "fcmToken": "bob-device" }))
        .await
        .assert_status_ok();
    send(&app, "alice", "bob", "After token").await;

    let sent = app.pushes.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].token, "bob-device");
    assert_eq!(sent[0].title, "After token");
    assert_eq!(sent[0].body, "hello");
}

#[tokio::test]
async fn test_email_and_sms_need_a_known_recipient() {
    let app = TestApp::new();

    let email = app
        .post("alice", "sendEmailNotification", json!({ "userId": "ghost", "subject": "Hi", "body": "..." }))
        .await;
    assert_error(&email, 404, "USER_NOT_FOUND");

    app.create_profile("bob", None).await;
    app.post("alice", "sendEmailNotification", json!({ "userId": "bob", "subject": "Hi", "body": "..." }))
        .await
        .assert_status_ok();
    app.post("alice", "sendSMSNotification", json!({ "userId": "bob", "message": "Hi" }))
        .await
        .assert_status_ok();
}
