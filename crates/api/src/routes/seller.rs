//! Route definitions for the `/seller` resource.
//!
//! Every endpoint requires an approved seller.

use axum::routing::get;
use axum::Router;

use crate::handlers::listing;
use crate::state::AppState;

/// Routes mounted at `/seller`.
///
/// ```text
/// GET    /listings                  -> list_my_listings
/// POST   /listings                  -> create_listing
/// GET    /analytics                 -> sales_analytics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/listings",
            get(listing::list_my_listings).post(listing::create_listing),
        )
        .route("/analytics", get(listing::sales_analytics))
}
