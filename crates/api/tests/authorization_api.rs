//! HTTP-level tests for session handling and role/approval enforcement.
//!
//! Seller-only routes check the seller status against the user store on
//! every request; the session claim is used only when the store read fails.

mod common;

use amari_core::roles::{Role, SellerStatus};
use amari_db::models::user::User;
use axum::http::StatusCode;
use common::{
    body_json, create_admin, create_buyer, create_seller, fresh_store, get, get_auth,
    patch_json_auth, post_auth, token_for, token_with,
};
use serde_json::json;

fn stale_token(user: &User, claimed: SellerStatus) -> String {
    token_with(user.id, user.role, Some(claimed))
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_unauthenticated() {
    let (store, _stores) = fresh_store();
    let app = common::build_test_app(store);

    let response = get(app, "/api/v1/orders").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn invalid_token_is_treated_as_no_session() {
    let (store, _stores) = fresh_store();
    let app = common::build_test_app(store);

    let response = get_auth(app, "/api/v1/notifications", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_store_record_over_claims() {
    let (store, stores) = fresh_store();
    let seller = create_seller(&stores, "Ada", SellerStatus::Approved).await;
    let app = common::build_test_app(store);

    let token = stale_token(&seller, SellerStatus::Pending);
    let json = body_json(get_auth(app, "/api/v1/auth/me", &token).await).await;

    assert_eq!(json["data"]["user_id"], seller.id);
    assert_eq!(json["data"]["role"], "seller");
    assert_eq!(json["data"]["seller_status"], "approved");
    assert_eq!(json["data"]["user"]["email"], "ada@test.com");
}

#[tokio::test]
async fn me_falls_back_to_claims_when_store_is_down() {
    let (store, stores) = fresh_store();
    let seller = create_seller(&stores, "Ada", SellerStatus::Approved).await;
    store.set_fail_on_user_reads(true).await;
    let app = common::build_test_app(store);

    let token = stale_token(&seller, SellerStatus::Pending);
    let response = get_auth(app, "/api/v1/auth/me", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["seller_status"], "pending");
    assert!(json["data"]["user"].is_null());
}

// ---------------------------------------------------------------------------
// Role checks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn buyer_cannot_reach_seller_routes() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let app = common::build_test_app(store);

    let response = get_auth(app, "/api/v1/seller/listings", &token_for(&buyer)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn non_admin_cannot_reach_admin_routes() {
    let (store, stores) = fresh_store();
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let app = common::build_test_app(store);

    let response = get_auth(app, "/api/v1/admin/users", &token_for(&seller)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_reaches_admin_routes() {
    let (store, stores) = fresh_store();
    let admin = create_admin(&stores, "Root").await;
    let app = common::build_test_app(store);

    let response = get_auth(app, "/api/v1/admin/users", &token_for(&admin)).await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Seller approval
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unapproved_sellers_are_forbidden_on_seller_routes() {
    for status in [
        SellerStatus::None,
        SellerStatus::Pending,
        SellerStatus::Rejected,
    ] {
        let (store, stores) = fresh_store();
        let seller = create_seller(&stores, "Segun", status).await;
        let app = common::build_test_app(store);

        let response = get_auth(app, "/api/v1/seller/listings", &token_for(&seller)).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "status {status}");
    }
}

#[tokio::test]
async fn pending_seller_can_still_use_shared_routes() {
    let (store, stores) = fresh_store();
    let seller = create_seller(&stores, "Segun", SellerStatus::Pending).await;
    let app = common::build_test_app(store);
    let token = token_for(&seller);

    let orders = get_auth(app.clone(), "/api/v1/orders", &token).await;
    assert_eq!(orders.status(), StatusCode::OK);

    let notifications = get_auth(app, "/api/v1/notifications", &token).await;
    assert_eq!(notifications.status(), StatusCode::OK);
}

#[tokio::test]
async fn store_approval_overrides_stale_pending_claim() {
    let (store, stores) = fresh_store();
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let app = common::build_test_app(store);

    let token = stale_token(&seller, SellerStatus::Pending);
    let response = get_auth(app, "/api/v1/seller/listings", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn store_rejection_overrides_stale_approved_claim() {
    let (store, stores) = fresh_store();
    let seller = create_seller(&stores, "Segun", SellerStatus::Rejected).await;
    let app = common::build_test_app(store);

    let token = stale_token(&seller, SellerStatus::Approved);
    let response = get_auth(app, "/api/v1/seller/listings", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_seller_is_not_approved() {
    let (store, _stores) = fresh_store();
    let app = common::build_test_app(store);

    let token = token_with(999, Role::Seller, Some(SellerStatus::Approved));
    let response = get_auth(app, "/api/v1/seller/listings", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn store_outage_falls_back_to_session_claim() {
    let (store, stores) = fresh_store();
    let seller = create_seller(&stores, "Segun", SellerStatus::Pending).await;
    store.set_fail_on_user_reads(true).await;
    let app = common::build_test_app(store);

    // The store would say pending, but it cannot be read.
    let claimed_approved = stale_token(&seller, SellerStatus::Approved);
    let response = get_auth(app.clone(), "/api/v1/seller/listings", &claimed_approved).await;
    assert_eq!(response.status(), StatusCode::OK);

    let claimed_pending = stale_token(&seller, SellerStatus::Pending);
    let response = get_auth(app, "/api/v1/seller/listings", &claimed_pending).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_on_seller_or_admin_route_skips_approval() {
    let (store, stores) = fresh_store();
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let admin = create_admin(&stores, "Root").await;
    let listing = common::create_listing(
        &stores,
        seller.id,
        "Lagos Style",
        "6.99",
        amari_core::catalog::ListingFormat::Digital,
    )
    .await;
    let app = common::build_test_app(store);

    let response = patch_json_auth(
        app,
        &format!("/api/v1/listings/{}", listing.id),
        json!({ "name": "Lagos Style Vol. 2" }),
        &token_for(&admin),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Becoming a seller
// ---------------------------------------------------------------------------

#[tokio::test]
async fn become_seller_sets_pending_and_notifies_admins() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    let first = create_admin(&stores, "Root").await;
    let second = create_admin(&stores, "Ops").await;
    let app = common::build_test_app(store);

    let response = post_auth(app.clone(), "/api/v1/auth/become-seller", &token_for(&buyer)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "seller");
    assert_eq!(json["data"]["seller_status"], "pending");

    for admin in [&first, &second] {
        let json = body_json(get_auth(app.clone(), "/api/v1/notifications", &token_for(admin)).await)
            .await;
        let titles: Vec<&str> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Seller access requested"]);
    }

    // Still pending, so seller routes stay closed even with a fresh token.
    let token = token_with(buyer.id, Role::Seller, Some(SellerStatus::Pending));
    let response = get_auth(app, "/api/v1/seller/listings", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn become_seller_succeeds_when_notifications_are_down() {
    let (store, stores) = fresh_store();
    let buyer = create_buyer(&stores, "Bisi").await;
    create_admin(&stores, "Root").await;
    store.set_fail_on_notifications(true).await;
    let app = common::build_test_app(store);

    let response = post_auth(app, "/api/v1/auth/become-seller", &token_for(&buyer)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "seller");
    assert_eq!(json["data"]["seller_status"], "pending");
}

#[tokio::test]
async fn become_seller_keeps_existing_approval() {
    let (store, stores) = fresh_store();
    let seller = create_seller(&stores, "Segun", SellerStatus::Approved).await;
    let app = common::build_test_app(store);

    let json = body_json(
        post_auth(app, "/api/v1/auth/become-seller", &token_for(&seller)).await,
    )
    .await;

    assert_eq!(json["data"]["seller_status"], "approved");
}
