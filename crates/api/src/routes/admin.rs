//! Route definitions for the `/admin` resource.
//!
//! All endpoints require the admin role.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /users                     -> list_users
/// GET    /sellers                   -> list_pending_sellers
/// POST   /sellers/{id}/approve      -> approve_seller
/// POST   /sellers/{id}/reject       -> reject_seller
/// GET    /listings/pending          -> list_pending_listings
/// POST   /listings/{id}/approve     -> approve_listing
/// POST   /moderate                  -> moderate_all
/// GET    /counts                    -> counts
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/sellers", get(admin::list_pending_sellers))
        .route("/sellers/{id}/approve", post(admin::approve_seller))
        .route("/sellers/{id}/reject", post(admin::reject_seller))
        .route("/listings/pending", get(admin::list_pending_listings))
        .route("/listings/{id}/approve", post(admin::approve_listing))
        .route("/moderate", post(admin::moderate_all))
        .route("/counts", get(admin::counts))
}
