//! Swap API integration tests
//!
//! Proposal, acceptance and decline, including the records an accepted swap
//! fans out to (items, deliveries, notifications).

#![cfg(feature = "ssr")]

mod common;

use common::{assert_error, TestApp};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use swapin::backend::store::Query;
use swapin::shared::collections;

async fn notifications_of_type(app: &TestApp, uid: &str, kind: &str) -> Vec<Value> {
    let body: Value = app.get(uid, "getNotifications", &[]).await.json();
    body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["type"] == json!(kind))
        .cloned()
        .collect()
}

#[tokio::test]
async fn test_accepted_swap_fans_out() {
    let app = TestApp::new();
    let bike = app.list_item("alice", "Mountain Bike", 1500.0).await;
    let tent = app.list_item("bob", "Camping Tent", 3000.0).await;

    let swap_id = app.propose("alice", &bike, &tent).await;
    assert_eq!(app.item(&tent).await["offers"], json!(1));

    let response = app.post("bob", "acceptSwap", json!({ "swapId": swap_id })).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["success"], json!(true));

    assert_eq!(app.item(&bike).await["status"], json!("swapped"));
    assert_eq!(app.item(&tent).await["status"], json!("swapped"));

    let legs = app
        .store()
        .query(&Query::collection(collections::DELIVERIES).where_eq("swapId", swap_id.clone()))
        .await
        .unwrap();
    assert_eq!(legs.len(), 2);
    let mut routes: Vec<(String, String, String)> = legs
        .iter()
        .map(|leg| {
            (
                leg.data["itemId"].as_str().unwrap().to_string(),
                leg.data["fromUserId"].as_str().unwrap().to_string(),
                leg.data["toUserId"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    routes.sort();
    let mut expected = vec![
        (bike.clone(), "alice".to_string(), "bob".to_string()),
        (tent.clone(), "bob".to_string(), "alice".to_string()),
    ];
    expected.sort();
    assert_eq!(routes, expected);

    assert_eq!(notifications_of_type(&app, "alice", "swap_accepted").await.len(), 1);
    assert_eq!(notifications_of_type(&app, "bob", "swap_accepted").await.len(), 1);
    assert_eq!(notifications_of_type(&app, "bob", "swap_proposed").await.len(), 1);
}

#[tokio::test]
async fn test_swap_cannot_be_accepted_twice() {
    let app = TestApp::new();
    let bike = app.list_item("alice", "Mountain Bike", 1500.0).await;
    let tent = app.list_item("bob", "Camping Tent", 3000.0).await;
    let swap_id = app.propose("alice", &bike, &tent).await;

    app.post("bob", "acceptSwap", json!({ "swapId": swap_id }))
        .await
        .assert_status_ok();
    let again = app.post("bob", "acceptSwap", json!({ "swapId": swap_id })).await;
    assert_error(&again, 400, "INVALID_STATUS");
}

#[tokio::test]
async fn test_competing_offer_fails_after_items_swapped() {
    let app = TestApp::new();
    let bike = app.list_item("alice", "Mountain Bike", 1500.0).await;
    let tent = app.list_item("bob", "Camping Tent", 3000.0).await;
    let kayak = app.list_item("carol", "River Kayak", 5000.0).await;

    let first = app.propose("alice", &bike, &tent).await;
    let second = app.propose("carol", &kayak, &tent).await;

    app.post("bob", "acceptSwap", json!({ "swapId": first }))
        .await
        .assert_status_ok();
    let late = app.post("bob", "acceptSwap", json!({ "swapId": second })).await;
    assert_error(&late, 400, "INACTIVE_ITEMS");
    assert_eq!(app.item(&kayak).await["status"], json!("active"));
}

#[tokio::test]
async fn test_cannot_swap_with_yourself() {
    let app = TestApp::new();
    let bike = app.list_item("alice", "Mountain Bike", 1500.0).await;
    let tent = app.list_item("alice", "Camping Tent", 3000.0).await;

    let response = app
        .post("alice", "proposeSwap", json!({ "itemOfferedId": bike, "itemRequestedId": tent }))
        .await;
    assert_error(&response, 400, "SELF_SWAP");
}

#[tokio::test]
async fn test_propose_requires_both_items() {
    let app = TestApp::new();
    let bike = app.list_item("alice", "Mountain Bike", 1500.0).await;

    let response = app
        .post("alice", "proposeSwap", json!({ "itemOfferedId": bike }))
        .await;
    assert_error(&response, 400, "MISSING_ITEMS");
}

#[tokio::test]
async fn test_only_receiver_responds() {
    let app = TestApp::new();
    let bike = app.list_item("alice", "Mountain Bike", 1500.0).await;
    let tent = app.list_item("bob", "Camping Tent", 3000.0).await;
    let swap_id = app.propose("alice", &bike, &tent).await;

    let response = app.post("alice", "acceptSwap", json!({ "swapId": swap_id })).await;
    assert_error(&response, 403, "NOT_AUTHORIZED");

    let missing = app.post("bob", "acceptSwap", json!({ "swapId": "nope" })).await;
    assert_error(&missing, 404, "SWAP_NOT_FOUND");
}

#[tokio::test]
async fn test_decline_swap() {
    let app = TestApp::new();
    let bike = app.list_item("alice", "Mountain Bike", 1500.0).await;
    let tent = app.list_item("bob", "Camping Tent", 3000.0).await;
    let swap_id = app.propose("alice", &bike, &tent).await;

    app.post("bob", "declineSwap", json!({ "swapId": swap_id }))
        .await
        .assert_status_ok();
    assert_eq!(notifications_of_type(&app, "alice", "swap_declined").await.len(), 1);
    assert_eq!(app.item(&tent).await["status"], json!("active"));

    let accept = app.post("bob", "acceptSwap", json!({ "swapId": swap_id })).await;
    assert_error(&accept, 400, "INVALID_STATUS");
    let decline = app.post("bob", "declineSwap", json!({ "swapId": swap_id })).await;
    assert_error(&decline, 400, "INVALID_STATUS");
}

#[tokio::test]
async fn test_user_swaps_lists_both_roles() {
    let app = TestApp::new();
    let bike = app.list_item("alice", "Mountain Bike", 1500.0).await;
    let tent = app.list_item("bob", "Camping Tent", 3000.0).await;
    let swap_id = app.propose("alice", &bike, &tent).await;

    for uid in ["alice", "bob"] {
        let swaps: Value = app.get(uid, "getUserSwaps", &[]).await.json();
        assert_eq!(swaps.as_array().unwrap().len(), 1);
        assert_eq!(swaps[0]["id"], json!(swap_id));
        assert_eq!(swaps[0]["netAmount"], json!(1500.0));
    }
    let none: Value = app.get("carol", "getUserSwaps", &[]).await.json();
    assert!(none.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_proposal_is_pushed_to_receiver() {
    let app = TestApp::new();
    app.create_profile("bob", Some("bob-device")).await;
    let bike = app.list_item("alice", "Mountain Bike", 1500.0).await;
    let tent = app.list_item("bob", "Camping Tent", 3000.0).await;

    app.propose("alice", &bike, &tent).await;

    let sent = app.pushes.sent.lock().await;
    let offers: Vec<_> = sent.iter().filter(|m| m.title == "New Swap Offer").collect();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].token, "bob-device");
    assert_eq!(offers[0].data.get("type").map(String::as_str), Some("swap_proposed"));
}
