//! Route definitions for the `/listings` resource.

use axum::routing::patch;
use axum::Router;

use crate::handlers::listing;
use crate::state::AppState;

/// Routes mounted at `/listings`.
///
/// ```text
/// PATCH  /{id}                      -> update_listing
/// DELETE /{id}                      -> delete_listing
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        patch(listing::update_listing).delete(listing::delete_listing),
    )
}
