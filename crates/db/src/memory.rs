//! In-memory implementation of every store trait.
//!
//! Used by unit and API tests, and selectable at runtime with
//! `STORAGE_BACKEND=memory` for local development. All tables live in one
//! [`MemoryState`] behind a single `RwLock`, so every trait method sees a
//! consistent snapshot and multi-row writes (order header plus items) are
//! atomic.

use std::collections::HashMap;

use amari_core::analytics::month_key;
use amari_core::catalog::ListingFormat;
use amari_core::messaging::preview;
use amari_core::orders::OrderStatus;
use amari_core::roles::{Role, SellerStatus};
use amari_core::types::{DbId, Money, Timestamp};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::conversation::{
    Conversation, ConversationKey, ConversationSummary, Message, NewMessage,
};
use crate::models::listing::{CreateListing, Listing, UpdateListing};
use crate::models::notification::{CreateNotification, Notification};
use crate::models::order::{Download, MonthlyTotal, NewOrder, Order, OrderItem, OrderWithItems};
use crate::models::user::{CreateUser, User};
use crate::repositories::{
    ConversationStore, ListingStore, NotificationStore, OrderStore, UserStore,
};

/// Every table, plus one id sequence per table.
#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    listings: Vec<Listing>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    notifications: Vec<Notification>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    sequences: HashMap<&'static str, DbId>,
}

impl MemoryState {
    fn next_id(&mut self, table: &'static str) -> DbId {
        let id = self.sequences.entry(table).or_insert(0);
        *id += 1;
        *id
    }
}

/// Newest first, ties broken by id.
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (Timestamp, DbId)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// Store double holding all data in process memory.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    fail_on_notifications: RwLock<bool>,
    fail_on_user_reads: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every notification write fail with [`StoreError::Unavailable`].
    pub async fn set_fail_on_notifications(&self, fail: bool) {
        *self.fail_on_notifications.write().await = fail;
    }

    /// Make user reads fail with [`StoreError::Unavailable`], simulating an
    /// unreachable user store.
    pub async fn set_fail_on_user_reads(&self, fail: bool) {
        *self.fail_on_user_reads.write().await = fail;
    }

    /// Overwrite an order's creation time. Lets tests place orders in past
    /// months.
    pub async fn set_order_created_at(&self, id: DbId, created_at: Timestamp) -> bool {
        let mut state = self.state.write().await;
        match state.orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.created_at = created_at;
                true
            }
            None => false,
        }
    }

    /// Number of order item rows across all orders.
    pub async fn order_item_count(&self) -> usize {
        self.state.read().await.order_items.len()
    }

    async fn check_user_reads(&self) -> StoreResult<()> {
        if *self.fail_on_user_reads.read().await {
            return Err(StoreError::Unavailable("user store unavailable".into()));
        }
        Ok(())
    }

    async fn check_notifications(&self) -> StoreResult<()> {
        if *self.fail_on_notifications.read().await {
            return Err(StoreError::Unavailable("notification store unavailable".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, input: &CreateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let user = User {
            id: state.next_id("users"),
            name: input.name.clone(),
            email: input.email.clone(),
            role: input.role,
            seller_status: input.seller_status,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        self.check_user_reads().await?;
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn seller_status(&self, id: DbId) -> StoreResult<Option<SellerStatus>> {
        self.check_user_reads().await?;
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).map(|u| u.seller_status))
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        self.check_user_reads().await?;
        let mut users = self.state.read().await.users.clone();
        newest_first(&mut users, |u| (u.created_at, u.id));
        Ok(users)
    }

    async fn list_pending_sellers(&self) -> StoreResult<Vec<User>> {
        self.check_user_reads().await?;
        let mut users: Vec<User> = self
            .state
            .read()
            .await
            .users
            .iter()
            .filter(|u| u.role == Role::Seller && u.seller_status == SellerStatus::Pending)
            .cloned()
            .collect();
        newest_first(&mut users, |u| (u.created_at, u.id));
        Ok(users)
    }

    async fn list_admin_ids(&self) -> StoreResult<Vec<DbId>> {
        self.check_user_reads().await?;
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| u.role == Role::Admin)
            .map(|u| u.id)
            .collect())
    }

    async fn request_seller_access(&self, id: DbId) -> StoreResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.role = Role::Seller;
            user.seller_status = user.seller_status.after_seller_request();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_seller_status(
        &self,
        id: DbId,
        status: SellerStatus,
    ) -> StoreResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.seller_status = status;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn count(&self) -> StoreResult<i64> {
        self.check_user_reads().await?;
        Ok(self.state.read().await.users.len() as i64)
    }
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[async_trait]
impl ListingStore for MemoryStore {
    async fn create(&self, input: &CreateListing) -> StoreResult<Listing> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let listing = Listing {
            id: state.next_id("listings"),
            seller_id: input.seller_id,
            name: input.name.clone(),
            summary: input.summary.clone(),
            price: input.price,
            format: input.format,
            approved: false,
            created_at: now,
            updated_at: now,
        };
        state.listings.push(listing.clone());
        Ok(listing)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Listing>> {
        let state = self.state.read().await;
        Ok(state.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn find_many(&self, ids: &[DbId]) -> StoreResult<Vec<Listing>> {
        let state = self.state.read().await;
        Ok(state
            .listings
            .iter()
            .filter(|l| ids.contains(&l.id))
            .cloned()
            .collect())
    }

    async fn list_for_seller(&self, seller_id: DbId) -> StoreResult<Vec<Listing>> {
        let mut listings: Vec<Listing> = self
            .state
            .read()
            .await
            .listings
            .iter()
            .filter(|l| l.seller_id == seller_id)
            .cloned()
            .collect();
        newest_first(&mut listings, |l| (l.created_at, l.id));
        Ok(listings)
    }

    async fn list_pending(&self) -> StoreResult<Vec<Listing>> {
        let mut listings: Vec<Listing> = self
            .state
            .read()
            .await
            .listings
            .iter()
            .filter(|l| !l.approved)
            .cloned()
            .collect();
        newest_first(&mut listings, |l| (l.created_at, l.id));
        Ok(listings)
    }

    async fn update(&self, id: DbId, input: &UpdateListing) -> StoreResult<Option<Listing>> {
        let mut state = self.state.write().await;
        Ok(state.listings.iter_mut().find(|l| l.id == id).map(|listing| {
            if let Some(name) = &input.name {
                listing.name = name.clone();
            }
            if let Some(summary) = &input.summary {
                listing.summary = Some(summary.clone());
            }
            if let Some(price) = input.price {
                listing.price = price;
            }
            if let Some(format) = input.format {
                listing.format = format;
            }
            listing.approved = false;
            listing.updated_at = Utc::now();
            listing.clone()
        }))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.listings.len();
        state.listings.retain(|l| l.id != id);
        Ok(state.listings.len() < before)
    }

    async fn approve(&self, id: DbId) -> StoreResult<Option<Listing>> {
        let mut state = self.state.write().await;
        Ok(state.listings.iter_mut().find(|l| l.id == id).map(|listing| {
            listing.approved = true;
            listing.updated_at = Utc::now();
            listing.clone()
        }))
    }

    async fn approve_all(&self) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut changed = 0;
        for listing in state.listings.iter_mut().filter(|l| !l.approved) {
            listing.approved = true;
            listing.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.state.read().await.listings.len() as i64)
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create(&self, input: &NewOrder) -> StoreResult<OrderWithItems> {
        let mut state = self.state.write().await;
        let order = Order {
            id: state.next_id("orders"),
            user_id: input.user_id,
            status: input.status,
            total: input.total,
            created_at: Utc::now(),
        };
        let items: Vec<OrderItem> = input
            .items
            .iter()
            .map(|line| OrderItem {
                id: state.next_id("order_items"),
                order_id: order.id,
                listing_id: line.listing_id,
                qty: line.qty,
                price: line.price,
                format: line.format,
            })
            .collect();
        state.orders.push(order.clone());
        state.order_items.extend(items.iter().cloned());
        Ok(OrderWithItems { order, items })
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<OrderWithItems>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut orders, |o| (o.created_at, o.id));
        Ok(orders
            .into_iter()
            .map(|order| {
                let items = state
                    .order_items
                    .iter()
                    .filter(|i| i.order_id == order.id)
                    .cloned()
                    .collect();
                OrderWithItems { order, items }
            })
            .collect())
    }

    async fn update_status(&self, id: DbId, status: OrderStatus) -> StoreResult<Option<Order>> {
        let mut state = self.state.write().await;
        Ok(state.orders.iter_mut().find(|o| o.id == id).map(|order| {
            order.status = status;
            order.clone()
        }))
    }

    async fn downloads_for_user(&self, user_id: DbId) -> StoreResult<Vec<Download>> {
        let state = self.state.read().await;
        let mut rows: Vec<(Download, DbId)> = state
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .flat_map(|order| {
                state
                    .order_items
                    .iter()
                    .filter(move |i| i.order_id == order.id && i.format == ListingFormat::Digital)
                    .map(move |item| {
                        let download = Download {
                            listing_id: item.listing_id,
                            order_id: order.id,
                            purchased_at: order.created_at,
                        };
                        (download, item.id)
                    })
            })
            .collect();
        newest_first(&mut rows, |(d, item_id)| (d.purchased_at, *item_id));
        Ok(rows.into_iter().map(|(d, _)| d).collect())
    }

    async fn seller_monthly_sales(
        &self,
        seller_id: DbId,
        since: Timestamp,
    ) -> StoreResult<Vec<MonthlyTotal>> {
        let state = self.state.read().await;
        let mut totals: HashMap<String, Money> = HashMap::new();
        for order in state.orders.iter().filter(|o| o.created_at >= since) {
            for item in state.order_items.iter().filter(|i| i.order_id == order.id) {
                let owned = state
                    .listings
                    .iter()
                    .any(|l| l.id == item.listing_id && l.seller_id == seller_id);
                if owned {
                    *totals
                        .entry(month_key(order.created_at.date_naive()))
                        .or_default() += item.price * Money::from(item.qty);
                }
            }
        }
        let mut rows: Vec<MonthlyTotal> = totals
            .into_iter()
            .map(|(month, sales)| MonthlyTotal { month, sales })
            .collect();
        rows.sort_by(|a, b| a.month.cmp(&b.month));
        Ok(rows)
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.state.read().await.orders.len() as i64)
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, input: &CreateNotification) -> StoreResult<Notification> {
        self.check_notifications().await?;
        let mut state = self.state.write().await;
        let notification = Notification {
            id: state.next_id("notifications"),
            user_id: input.user_id,
            title: input.title.clone(),
            body: input.body.clone(),
            read_at: None,
            created_at: Utc::now(),
        };
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self
            .state
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut notifications, |n| (n.created_at, n.id));
        Ok(notifications)
    }

    async fn mark_read(&self, id: DbId, user_id: DbId) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let row = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id && n.read_at.is_none());
        Ok(match row {
            Some(notification) => {
                notification.read_at = Some(Utc::now());
                true
            }
            None => false,
        })
    }

    async fn mark_all_read(&self, user_id: DbId) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut changed = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && n.read_at.is_none())
        {
            notification.read_at = Some(now);
            changed += 1;
        }
        Ok(changed)
    }

    async fn unread_count(&self, user_id: DbId) -> StoreResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.read_at.is_none())
            .count() as i64)
    }
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn find_by_key(&self, key: &ConversationKey) -> StoreResult<Option<Conversation>> {
        let state = self.state.read().await;
        Ok(state.conversations.iter().find(|c| c.key() == *key).cloned())
    }

    async fn create(&self, key: &ConversationKey) -> StoreResult<Conversation> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.conversations.iter().find(|c| c.key() == *key) {
            return Ok(existing.clone());
        }
        let conversation = Conversation {
            id: state.next_id("conversations"),
            buyer_id: key.buyer_id,
            seller_id: key.seller_id,
            order_id: key.order_id,
            created_at: Utc::now(),
        };
        state.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Conversation>> {
        let state = self.state.read().await;
        Ok(state.conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<ConversationSummary>> {
        let state = self.state.read().await;
        let mut summaries: Vec<ConversationSummary> = state
            .conversations
            .iter()
            .filter(|c| c.is_participant(user_id))
            .map(|conversation| {
                let last = state
                    .messages
                    .iter()
                    .filter(|m| m.conversation_id == conversation.id)
                    .max_by_key(|m| (m.created_at, m.id));
                ConversationSummary {
                    conversation: conversation.clone(),
                    last_message_preview: last.map(|m| preview(&m.body)),
                    last_message_at: last.map(|m| m.created_at),
                    last_activity_at: last.map_or(conversation.created_at, |m| m.created_at),
                }
            })
            .collect();
        newest_first(&mut summaries, |s| (s.last_activity_at, s.conversation.id));
        Ok(summaries)
    }

    async fn list_messages(&self, conversation_id: DbId) -> StoreResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .state
            .read()
            .await
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.created_at, m.id));
        Ok(messages)
    }

    async fn append_message(&self, input: &NewMessage) -> StoreResult<Message> {
        let mut state = self.state.write().await;
        let message = Message {
            id: state.next_id("messages"),
            conversation_id: input.conversation_id,
            sender_id: input.sender_id,
            body: input.body.clone(),
            created_at: Utc::now(),
        };
        state.messages.push(message.clone());
        Ok(message)
    }
}
