pub mod admin;
pub mod auth;
pub mod conversation;
pub mod health;
pub mod listing;
pub mod notification;
pub mod order;
pub mod seller;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/me                                         session introspection
/// /auth/become-seller                              request seller access (POST)
///
/// /orders                                          list, place (GET, POST)
/// /orders/{id}/status                              set status (POST, admin only)
/// /downloads                                       purchased digital issues
///
/// /conversations                                   list, open (GET, POST)
/// /conversations/{id}/messages                     list, send (GET, POST)
///
/// /notifications                                   list with unread count
/// /notifications/unread-count                      unread count (GET)
/// /notifications/read-all                          mark all read (POST)
/// /notifications/{id}                              mark read (PATCH)
///
/// /seller/listings                                 list, create (approved seller)
/// /seller/analytics                                monthly sales (approved seller)
/// /listings/{id}                                   update, delete (seller or admin)
///
/// /admin/users                                     list users
/// /admin/sellers                                   pending seller requests
/// /admin/sellers/{id}/approve                      approve seller (POST)
/// /admin/sellers/{id}/reject                       reject seller (POST)
/// /admin/listings/pending                          unapproved listings
/// /admin/listings/{id}/approve                     approve listing (POST)
/// /admin/moderate                                  approve all pending (POST)
/// /admin/counts                                    dashboard counts
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/orders", order::router())
        .route("/downloads", get(handlers::order::list_downloads))
        .nest("/conversations", conversation::router())
        .nest("/notifications", notification::router())
        .nest("/seller", seller::router())
        .nest("/listings", listing::router())
        .nest("/admin", admin::router())
}
