//! Handlers for the `/conversations` resource.
//!
//! Every endpoint is open to all authenticated roles; access to a single
//! conversation is decided by participant membership in
//! [`ConversationService`](crate::services::ConversationService).

use amari_core::error::{CODE_EMPTY_MESSAGE, CODE_VALIDATION};
use amari_core::messaging::MessageBody;
use amari_core::types::DbId;
use amari_db::models::conversation::{ConversationKey, ConversationSummary, Message};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::json_body;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /conversations`.
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(alias = "buyerId")]
    pub buyer_id: DbId,
    #[serde(alias = "sellerId")]
    pub seller_id: DbId,
    #[serde(default, alias = "orderId")]
    pub order_id: Option<DbId>,
}

/// Body for `POST /conversations/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: DbId,
}

/// POST /api/v1/conversations
///
/// Find or create the conversation for `(buyer_id, seller_id, order_id)`.
/// The caller must be the buyer or the seller.
pub async fn create_conversation(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    payload: Result<Json<CreateConversationRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<IdResponse>>> {
    let input = json_body(payload, CODE_VALIDATION)?;
    let key = ConversationKey {
        buyer_id: input.buyer_id,
        seller_id: input.seller_id,
        order_id: input.order_id,
    };
    let id = state
        .conversations
        .open_conversation(session.user_id, key)
        .await?;
    Ok(Json(DataResponse { data: IdResponse { id } }))
}

/// GET /api/v1/conversations
pub async fn list_conversations(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ConversationSummary>>>> {
    let conversations = state.conversations.list_conversations(session.user_id).await?;
    Ok(Json(DataResponse {
        data: conversations,
    }))
}

/// GET /api/v1/conversations/{id}/messages
pub async fn list_messages(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(conversation_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Message>>>> {
    let messages = state
        .conversations
        .list_messages(conversation_id, session.user_id)
        .await?;
    Ok(Json(DataResponse { data: messages }))
}

/// POST /api/v1/conversations/{id}/messages
///
/// Append a message as the caller. Blank bodies are rejected with
/// `EMPTY_MESSAGE` before any lookup.
pub async fn send_message(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(conversation_id): Path<DbId>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<IdResponse>>)> {
    let input = json_body(payload, CODE_EMPTY_MESSAGE)?;
    let body = MessageBody::parse(&input.body)?;
    let message = state
        .conversations
        .send_message(conversation_id, session.user_id, body)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: IdResponse { id: message.id },
        }),
    ))
}
