//! Repository for the `conversations` and `messages` tables.

use amari_core::messaging::PREVIEW_CHARS;
use amari_core::types::DbId;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};
use crate::models::conversation::{
    Conversation, ConversationKey, ConversationSummary, Message, NewMessage,
};

/// Column list for `conversations` queries.
const COLUMNS: &str = "id, buyer_id, seller_id, order_id, created_at";

/// Column list for `messages` queries.
const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, body, created_at";

/// Buyer/seller threads and their messages.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Exact identity lookup. `order_id = None` only matches conversations
    /// without an order.
    async fn find_by_key(&self, key: &ConversationKey) -> StoreResult<Option<Conversation>>;

    /// Insert the conversation, or return the existing one with the same key.
    async fn create(&self, key: &ConversationKey) -> StoreResult<Conversation>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Conversation>>;

    /// Conversations the user takes part in, most recent activity first.
    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<ConversationSummary>>;

    /// Messages of one conversation, oldest first.
    async fn list_messages(&self, conversation_id: DbId) -> StoreResult<Vec<Message>>;

    async fn append_message(&self, input: &NewMessage) -> StoreResult<Message>;
}

/// Postgres implementation of [`ConversationStore`].
#[derive(Clone)]
pub struct ConversationRepo {
    pool: PgPool,
}

impl ConversationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for ConversationRepo {
    async fn find_by_key(&self, key: &ConversationKey) -> StoreResult<Option<Conversation>> {
        let query = format!(
            "SELECT {COLUMNS} FROM conversations
             WHERE buyer_id = $1 AND seller_id = $2 AND order_id IS NOT DISTINCT FROM $3"
        );
        let conversation = sqlx::query_as::<_, Conversation>(&query)
            .bind(key.buyer_id)
            .bind(key.seller_id)
            .bind(key.order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(conversation)
    }

    async fn create(&self, key: &ConversationKey) -> StoreResult<Conversation> {
        // Concurrent creators race on uq_conversations_identity; the loser
        // inserts nothing and reads the winner's row.
        let query = format!(
            "INSERT INTO conversations (buyer_id, seller_id, order_id)
             VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Conversation>(&query)
            .bind(key.buyer_id)
            .bind(key.seller_id)
            .bind(key.order_id)
            .fetch_optional(&self.pool)
            .await?;
        match inserted {
            Some(conversation) => Ok(conversation),
            None => {
                tracing::debug!(
                    buyer_id = key.buyer_id,
                    seller_id = key.seller_id,
                    "Conversation already exists, reusing"
                );
                self.find_by_key(key)
                    .await?
                    .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
            }
        }
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Conversation>> {
        let query = format!("SELECT {COLUMNS} FROM conversations WHERE id = $1");
        let conversation = sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(conversation)
    }

    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<ConversationSummary>> {
        let summaries = sqlx::query_as::<_, ConversationSummary>(
            "SELECT c.id, c.buyer_id, c.seller_id, c.order_id, c.created_at,
                    LEFT(last.body, $2) AS last_message_preview,
                    last.created_at AS last_message_at,
                    COALESCE(last.created_at, c.created_at) AS last_activity_at
             FROM conversations c
             LEFT JOIN LATERAL (
                 SELECT m.body, m.created_at FROM messages m
                 WHERE m.conversation_id = c.id
                 ORDER BY m.created_at DESC, m.id DESC
                 LIMIT 1
             ) last ON true
             WHERE c.buyer_id = $1 OR c.seller_id = $1
             ORDER BY last_activity_at DESC, c.id DESC",
        )
        .bind(user_id)
        .bind(PREVIEW_CHARS as i32)
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries)
    }

    async fn list_messages(&self, conversation_id: DbId) -> StoreResult<Vec<Message>> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE conversation_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        let messages = sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(messages)
    }

    async fn append_message(&self, input: &NewMessage) -> StoreResult<Message> {
        let query = format!(
            "INSERT INTO messages (conversation_id, sender_id, body)
             VALUES ($1, $2, $3)
             RETURNING {MESSAGE_COLUMNS}"
        );
        let message = sqlx::query_as::<_, Message>(&query)
            .bind(input.conversation_id)
            .bind(input.sender_id)
            .bind(&input.body)
            .fetch_one(&self.pool)
            .await?;
        Ok(message)
    }
}
