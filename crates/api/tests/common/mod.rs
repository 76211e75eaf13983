#![allow(dead_code)]

use std::sync::Arc;

use amari_core::access::Session;
use amari_core::catalog::ListingFormat;
use amari_core::roles::{Role, SellerStatus};
use amari_core::types::{DbId, Money};
use amari_db::memory::MemoryStore;
use amari_db::models::listing::{CreateListing, Listing};
use amari_db::models::user::{CreateUser, User};
use amari_db::Stores;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use amari_api::auth::jwt::{generate_access_token, JwtConfig};
use amari_api::config::{LogFormat, ServerConfig, StorageBackend};
use amari_api::router::build_app_router;
use amari_api::state::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Build a test `ServerConfig` with safe defaults and the in-memory backend.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        storage: StorageBackend::Memory,
        database_url: None,
        log_format: LogFormat::Pretty,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// on top of the given memory store.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    let config = Arc::new(test_config());
    let state = AppState::new(Stores::memory(store), config.clone());
    build_app_router(state, &config)
}

/// A fresh store plus the stores bundle for seeding it.
pub fn fresh_store() -> (Arc<MemoryStore>, Stores) {
    let store = Arc::new(MemoryStore::new());
    let stores = Stores::memory(store.clone());
    (store, stores)
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn create_user(stores: &Stores, name: &str, role: Role, status: SellerStatus) -> User {
    stores
        .users
        .create(&CreateUser {
            name: name.to_string(),
            email: format!("{}@test.com", name.to_lowercase()),
            role,
            seller_status: status,
        })
        .await
        .expect("user creation should succeed")
}

pub async fn create_buyer(stores: &Stores, name: &str) -> User {
    create_user(stores, name, Role::Buyer, SellerStatus::None).await
}

pub async fn create_seller(stores: &Stores, name: &str, status: SellerStatus) -> User {
    create_user(stores, name, Role::Seller, status).await
}

pub async fn create_admin(stores: &Stores, name: &str) -> User {
    create_user(stores, name, Role::Admin, SellerStatus::None).await
}

/// Create an approved listing at `price` (e.g. `"8.50"`).
pub async fn create_listing(
    stores: &Stores,
    seller_id: DbId,
    name: &str,
    price: &str,
    format: ListingFormat,
) -> Listing {
    let listing = stores
        .listings
        .create(&CreateListing {
            seller_id,
            name: name.to_string(),
            summary: None,
            price: price.parse::<Money>().expect("valid price"),
            format,
        })
        .await
        .expect("listing creation should succeed");
    stores
        .listings
        .approve(listing.id)
        .await
        .expect("approve should succeed")
        .expect("listing exists")
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Session token carrying the user's current role and seller status.
pub fn token_for(user: &User) -> String {
    token_with(user.id, user.role, Some(user.seller_status))
}

/// Session token with explicit claims, which may disagree with the store.
pub fn token_with(user_id: DbId, role: Role, seller_status: Option<SellerStatus>) -> String {
    let session = Session {
        user_id,
        role,
        seller_status,
    };
    generate_access_token(&session, &test_config().jwt).expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
