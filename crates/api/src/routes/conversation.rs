//! Route definitions for the `/conversations` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::conversation;
use crate::state::AppState;

/// Routes mounted at `/conversations`.
///
/// ```text
/// GET    /                          -> list_conversations
/// POST   /                          -> create_conversation
/// GET    /{id}/messages             -> list_messages
/// POST   /{id}/messages             -> send_message
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(conversation::list_conversations).post(conversation::create_conversation),
        )
        .route(
            "/{id}/messages",
            get(conversation::list_messages).post(conversation::send_message),
        )
}
