//! Buyer/seller conversations.
//!
//! Access to a conversation is granted solely by being its buyer or its
//! seller. Every read and write below checks that membership first.

use std::sync::Arc;

use amari_core::error::{CoreError, CODE_VALIDATION};
use amari_core::messaging::MessageBody;
use amari_core::types::DbId;
use amari_db::models::conversation::{
    Conversation, ConversationKey, ConversationSummary, Message, NewMessage,
};
use amari_db::repositories::{ConversationStore, UserStore};

use super::NotificationService;
use crate::error::AppResult;

#[derive(Clone)]
pub struct ConversationService {
    conversations: Arc<dyn ConversationStore>,
    users: Arc<dyn UserStore>,
    notifications: NotificationService,
}

impl ConversationService {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        users: Arc<dyn UserStore>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            conversations,
            users,
            notifications,
        }
    }

    /// Return the id of the conversation with exactly this key, creating it
    /// on first use.
    pub async fn ensure_conversation(&self, key: ConversationKey) -> AppResult<DbId> {
        if let Some(existing) = self.conversations.find_by_key(&key).await? {
            return Ok(existing.id);
        }
        let created = self.conversations.create(&key).await?;
        tracing::info!(
            conversation_id = created.id,
            buyer_id = key.buyer_id,
            seller_id = key.seller_id,
            order_id = ?key.order_id,
            "Conversation opened"
        );
        Ok(created.id)
    }

    /// [`ensure_conversation`](Self::ensure_conversation) on behalf of
    /// `caller_id`, who must be one of the two parties. The other party
    /// must exist.
    pub async fn open_conversation(
        &self,
        caller_id: DbId,
        key: ConversationKey,
    ) -> AppResult<DbId> {
        if key.buyer_id == key.seller_id {
            return Err(CoreError::validation(
                CODE_VALIDATION,
                "Buyer and seller must be different users",
            )
            .into());
        }
        let other = if caller_id == key.buyer_id {
            key.seller_id
        } else if caller_id == key.seller_id {
            key.buyer_id
        } else {
            return Err(CoreError::Forbidden(
                "You can only start conversations you take part in".into(),
            )
            .into());
        };
        if self.users.find_by_id(other).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "User",
                id: other,
            }
            .into());
        }
        self.ensure_conversation(key).await
    }

    pub async fn list_conversations(&self, user_id: DbId) -> AppResult<Vec<ConversationSummary>> {
        Ok(self.conversations.list_for_user(user_id).await?)
    }

    /// All messages, oldest first, if `caller_id` takes part.
    pub async fn list_messages(
        &self,
        conversation_id: DbId,
        caller_id: DbId,
    ) -> AppResult<Vec<Message>> {
        self.membership(conversation_id, caller_id).await?;
        Ok(self.conversations.list_messages(conversation_id).await?)
    }

    /// Append a message and notify the other participant with a preview.
    pub async fn send_message(
        &self,
        conversation_id: DbId,
        sender_id: DbId,
        body: MessageBody,
    ) -> AppResult<Message> {
        let conversation = self.membership(conversation_id, sender_id).await?;
        let preview = body.preview();
        let message = self
            .conversations
            .append_message(&NewMessage {
                conversation_id,
                sender_id,
                body: body.into_inner(),
            })
            .await?;
        tracing::info!(conversation_id, sender_id, message_id = message.id, "Message sent");

        if let Some(recipient) = conversation.counterpart(sender_id) {
            self.notifications
                .notify(recipient, "New message", Some(preview))
                .await;
        }
        Ok(message)
    }

    /// The conversation, if it exists and `user_id` is a participant.
    async fn membership(&self, conversation_id: DbId, user_id: DbId) -> AppResult<Conversation> {
        let conversation = self
            .conversations
            .find_by_id(conversation_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Conversation",
                id: conversation_id,
            })?;
        if !conversation.is_participant(user_id) {
            return Err(CoreError::Forbidden("Not a participant in this conversation".into()).into());
        }
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use amari_core::roles::{Role, SellerStatus};
    use amari_db::memory::MemoryStore;
    use amari_db::models::user::CreateUser;
    use amari_db::Stores;
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::AppError;

    struct Fixture {
        memory: Arc<MemoryStore>,
        stores: Stores,
        service: ConversationService,
        buyer: DbId,
        seller: DbId,
    }

    async fn fixture() -> Fixture {
        let memory = Arc::new(MemoryStore::new());
        let stores = Stores::memory(memory.clone());
        let service = ConversationService::new(
            stores.conversations.clone(),
            stores.users.clone(),
            NotificationService::new(stores.notifications.clone()),
        );
        let mut ids = Vec::new();
        for (name, role) in [("Bisi", Role::Buyer), ("Segun", Role::Seller)] {
            let user = stores
                .users
                .create(&CreateUser {
                    name: name.into(),
                    email: format!("{name}@example.com"),
                    role,
                    seller_status: SellerStatus::None,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        Fixture {
            memory,
            stores,
            service,
            buyer: ids[0],
            seller: ids[1],
        }
    }

    fn key(buyer_id: DbId, seller_id: DbId, order_id: Option<DbId>) -> ConversationKey {
        ConversationKey {
            buyer_id,
            seller_id,
            order_id,
        }
    }

    fn body(text: &str) -> MessageBody {
        MessageBody::parse(text).unwrap()
    }

    #[tokio::test]
    async fn ensure_is_idempotent_per_key() {
        let f = fixture().await;
        let first = f.service.ensure_conversation(key(f.buyer, f.seller, None)).await.unwrap();
        let again = f.service.ensure_conversation(key(f.buyer, f.seller, None)).await.unwrap();
        assert_eq!(first, again);

        let for_order = f
            .service
            .ensure_conversation(key(f.buyer, f.seller, Some(7)))
            .await
            .unwrap();
        assert_ne!(first, for_order);
    }

    #[tokio::test]
    async fn outsider_cannot_open_a_conversation() {
        let f = fixture().await;
        assert_matches!(
            f.service.open_conversation(999, key(f.buyer, f.seller, None)).await,
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
    }

    #[tokio::test]
    async fn opening_with_unknown_counterpart_is_not_found() {
        let f = fixture().await;
        assert_matches!(
            f.service.open_conversation(f.buyer, key(f.buyer, 555, None)).await,
            Err(AppError::Core(CoreError::NotFound { entity: "User", id: 555 }))
        );
    }

    #[tokio::test]
    async fn self_conversation_is_rejected() {
        let f = fixture().await;
        assert_matches!(
            f.service.open_conversation(f.buyer, key(f.buyer, f.buyer, None)).await,
            Err(AppError::Core(CoreError::Validation { .. }))
        );
    }

    #[tokio::test]
    async fn participant_message_notifies_only_the_other_side() {
        let f = fixture().await;
        let id = f.service.open_conversation(f.buyer, key(f.buyer, f.seller, None)).await.unwrap();

        let long = "word ".repeat(60);
        f.service.send_message(id, f.buyer, body(&long)).await.unwrap();

        let seller_inbox = f.stores.notifications.list_for_user(f.seller).await.unwrap();
        assert_eq!(seller_inbox.len(), 1);
        assert_eq!(seller_inbox[0].body.as_deref().map(|b| b.chars().count()), Some(120));
        assert!(f.stores.notifications.list_for_user(f.buyer).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_participant_cannot_send_or_read() {
        let f = fixture().await;
        let id = f.service.ensure_conversation(key(f.buyer, f.seller, None)).await.unwrap();

        assert_matches!(
            f.service.send_message(id, 999, body("hi")).await,
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
        assert_matches!(
            f.service.list_messages(id, 999).await,
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
        assert!(f.service.list_messages(id, f.seller).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let f = fixture().await;
        assert_matches!(
            f.service.list_messages(404, f.buyer).await,
            Err(AppError::Core(CoreError::NotFound { .. }))
        );
        assert_matches!(
            f.service.send_message(404, f.buyer, body("hi")).await,
            Err(AppError::Core(CoreError::NotFound { .. }))
        );
    }

    #[tokio::test]
    async fn messages_come_back_in_order() {
        let f = fixture().await;
        let id = f.service.ensure_conversation(key(f.buyer, f.seller, None)).await.unwrap();
        f.service.send_message(id, f.buyer, body("  is issue 4 in stock? ")).await.unwrap();
        f.service.send_message(id, f.seller, body("yes")).await.unwrap();

        let messages = f.service.list_messages(id, f.buyer).await.unwrap();
        let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["is issue 4 in stock?", "yes"]);
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_send() {
        let f = fixture().await;
        let id = f.service.ensure_conversation(key(f.buyer, f.seller, None)).await.unwrap();
        f.memory.set_fail_on_notifications(true).await;

        let message = f.service.send_message(id, f.seller, body("thanks")).await.unwrap();
        assert_eq!(message.sender_id, f.seller);
        assert_eq!(f.service.list_messages(id, f.buyer).await.unwrap().len(), 1);
    }
}
