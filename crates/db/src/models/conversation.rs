//! Conversation and message models.

use amari_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `conversations` table. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Conversation {
    pub id: DbId,
    pub buyer_id: DbId,
    pub seller_id: DbId,
    pub order_id: Option<DbId>,
    pub created_at: Timestamp,
}

impl Conversation {
    pub fn is_participant(&self, user_id: DbId) -> bool {
        user_id == self.buyer_id || user_id == self.seller_id
    }

    /// The participant on the other side of `user_id`, or `None` when
    /// `user_id` is not a participant.
    pub fn counterpart(&self, user_id: DbId) -> Option<DbId> {
        if user_id == self.buyer_id {
            Some(self.seller_id)
        } else if user_id == self.seller_id {
            Some(self.buyer_id)
        } else {
            None
        }
    }

    pub fn key(&self) -> ConversationKey {
        ConversationKey {
            buyer_id: self.buyer_id,
            seller_id: self.seller_id,
            order_id: self.order_id,
        }
    }
}

/// Identity of a conversation. Two keys that differ only in `order_id`
/// (including `None` vs `Some`) name different conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub buyer_id: DbId,
    pub seller_id: DbId,
    pub order_id: Option<DbId>,
}

/// A conversation with its most recent message, for inbox listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub conversation: Conversation,
    /// First characters of the latest message body.
    pub last_message_preview: Option<String>,
    pub last_message_at: Option<Timestamp>,
    /// Latest message time, or the conversation creation time when empty.
    pub last_activity_at: Timestamp,
}

/// A row from the `messages` table. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub conversation_id: DbId,
    pub sender_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}

/// DTO for appending a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: DbId,
    pub sender_id: DbId,
    pub body: String,
}
