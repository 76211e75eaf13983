//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// GET    /me                        -> me
/// POST   /become-seller             -> become_seller
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(auth::me))
        .route("/become-seller", post(auth::become_seller))
}
