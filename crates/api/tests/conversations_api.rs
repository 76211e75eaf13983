//! HTTP-level tests for buyer/seller conversations.

mod common;

use amari_core::roles::SellerStatus;
use amari_db::models::user::User;
use axum::http::StatusCode;
use axum::Router;
use common::{body_json, create_buyer, create_seller, fresh_store, get_auth, post_json_auth, token_for};
use serde_json::json;

async fn open(app: Router, caller: &User, buyer_id: i64, seller_id: i64, order_id: Option<i64>) -> i64 {
    let body = json!({ "buyer_id": buyer_id, "seller_id": seller_id, "order_id": order_id });
    let response = post_json_auth(app, "/api/v1/conversations", body, &token_for(caller)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn send(app: Router, caller: &User, conversation_id: i64, text: &str) -> axum::response::Response {
    post_json_auth(
        app,
        &format!("/api/v1/conversations/{conversation_id}/messages"),
        json!({ "body": text }),
        &token_for(caller),
    )
    .await
}

// ---------------------------------------------------------------------------
// Opening conversations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn opening_twice_returns_the_same_conversation() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let app = common::build_test_app(store);

    let first = open(app.clone(), &buyer, buyer.id, seller.id, None).await;
    let again = open(app.clone(), &seller, buyer.id, seller.id, None).await;
    let about_order = open(app, &buyer, buyer.id, seller.id, Some(12)).await;

    assert_eq!(first, again);
    assert_ne!(first, about_order);
}

#[tokio::test]
async fn camel_case_keys_are_accepted() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let app = common::build_test_app(store);

    let body = json!({ "buyerId": buyer.id, "sellerId": seller.id });
    let response = post_json_auth(app, "/api/v1/conversations", body, &token_for(&buyer)).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn order_id_is_not_checked_against_orders() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let app = common::build_test_app(store);

    let first = open(app.clone(), &buyer, buyer.id, seller.id, Some(9_999)).await;
    let again = open(app, &seller, buyer.id, seller.id, Some(9_999)).await;

    assert_eq!(first, again);
}

#[tokio::test]
async fn mistyped_ids_are_a_validation_error() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let app = common::build_test_app(store);

    let body = json!({ "buyerId": "abc", "sellerId": 2 });
    let response = post_json_auth(app, "/api/v1/conversations", body, &token_for(&buyer)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn outsiders_cannot_open_conversations_for_others() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let outsider = create_buyer(&stores, "Kemi").await;
    let app = common::build_test_app(store);

    let body = json!({ "buyer_id": buyer.id, "seller_id": seller.id });
    let response = post_json_auth(app, "/api/v1/conversations", body, &token_for(&outsider)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn conversation_with_self_is_rejected() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let app = common::build_test_app(store);

    let body = json!({ "buyer_id": buyer.id, "seller_id": buyer.id });
    let response = post_json_auth(app, "/api/v1/conversations", body, &token_for(&buyer)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn counterpart_must_exist() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let app = common::build_test_app(store);

    let body = json!({ "buyer_id": buyer.id, "seller_id": 4242 });
    let response = post_json_auth(app, "/api/v1/conversations", body, &token_for(&buyer)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sending_notifies_only_the_other_participant() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let app = common::build_test_app(store);
    let id = open(app.clone(), &buyer, buyer.id, seller.id, None).await;

    let response = send(app.clone(), &buyer, id, "Is issue 12 still in print?").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_json(response).await["data"]["id"].is_i64());

    let seller_inbox =
        body_json(get_auth(app.clone(), "/api/v1/notifications", &token_for(&seller)).await).await;
    let items = seller_inbox["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "New message");
    assert_eq!(items[0]["body"], "Is issue 12 still in print?");

    let buyer_inbox =
        body_json(get_auth(app, "/api/v1/notifications", &token_for(&buyer)).await).await;
    assert!(buyer_inbox["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn messages_are_listed_oldest_first() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let app = common::build_test_app(store);
    let id = open(app.clone(), &buyer, buyer.id, seller.id, None).await;

    send(app.clone(), &buyer, id, "Hello").await;
    send(app.clone(), &seller, id, "Hi, how can I help?").await;

    let json = body_json(
        get_auth(app, &format!("/api/v1/conversations/{id}/messages"), &token_for(&seller)).await,
    )
    .await;
    let bodies: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["Hello", "Hi, how can I help?"]);
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let app = common::build_test_app(store);
    let id = open(app.clone(), &buyer, buyer.id, seller.id, None).await;

    let response = send(app, &buyer, id, "   \n\t ").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "EMPTY_MESSAGE");
}

#[tokio::test]
async fn non_string_message_body_is_empty_message() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let app = common::build_test_app(store);
    let id = open(app.clone(), &buyer, buyer.id, seller.id, None).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/conversations/{id}/messages"),
        json!({ "body": 5 }),
        &token_for(&buyer),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "EMPTY_MESSAGE");
}

#[tokio::test]
async fn outsiders_cannot_read_or_write() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let outsider = create_buyer(&stores, "Kemi").await;
    let app = common::build_test_app(store);
    let id = open(app.clone(), &buyer, buyer.id, seller.id, None).await;

    let read = get_auth(
        app.clone(),
        &format!("/api/v1/conversations/{id}/messages"),
        &token_for(&outsider),
    )
    .await;
    assert_eq!(read.status(), StatusCode::FORBIDDEN);

    let write = send(app.clone(), &outsider, id, "Let me in").await;
    assert_eq!(write.status(), StatusCode::FORBIDDEN);

    // Nobody was notified of the refused message.
    let inbox = body_json(get_auth(app, "/api/v1/notifications", &token_for(&seller)).await).await;
    assert!(inbox["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_conversation_is_not_found() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let app = common::build_test_app(store);

    let response = get_auth(app, "/api/v1/conversations/999/messages", &token_for(&buyer)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inbox_shows_last_message_preview() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let outsider = create_buyer(&stores, "Kemi").await;
    let app = common::build_test_app(store);
    let id = open(app.clone(), &buyer, buyer.id, seller.id, None).await;

    let long = "a".repeat(300);
    send(app.clone(), &buyer, id, &long).await;

    let json = body_json(get_auth(app.clone(), "/api/v1/conversations", &token_for(&seller)).await)
        .await;
    let inbox = json["data"].as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["id"], id);
    assert_eq!(
        inbox[0]["last_message_preview"].as_str().unwrap().chars().count(),
        120
    );

    let json = body_json(get_auth(app, "/api/v1/conversations", &token_for(&outsider)).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}
