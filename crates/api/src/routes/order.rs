//! Route definitions for the `/orders` resource.
//!
//! All endpoints require authentication; status changes are admin-only.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::order;
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// GET    /                          -> list_orders
/// POST   /                          -> place_order
/// POST   /{id}/status               -> update_order_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(order::list_orders).post(order::place_order))
        .route("/{id}/status", post(order::update_order_status))
}
