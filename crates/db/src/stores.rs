//! The bundle of store implementations handed to the application state.

use std::sync::Arc;

use crate::memory::MemoryStore;
use crate::repositories::{
    ConversationRepo, ConversationStore, ListingRepo, ListingStore, NotificationRepo,
    NotificationStore, OrderRepo, OrderStore, UserRepo, UserStore,
};
use crate::DbPool;

/// One implementation of each store trait. Cheap to clone.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub listings: Arc<dyn ListingStore>,
    pub orders: Arc<dyn OrderStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub conversations: Arc<dyn ConversationStore>,
}

impl Stores {
    /// Postgres repositories sharing one pool.
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            users: Arc::new(UserRepo::new(pool.clone())),
            listings: Arc::new(ListingRepo::new(pool.clone())),
            orders: Arc::new(OrderRepo::new(pool.clone())),
            notifications: Arc::new(NotificationRepo::new(pool.clone())),
            conversations: Arc::new(ConversationRepo::new(pool)),
        }
    }

    /// Every store backed by the same [`MemoryStore`].
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            listings: store.clone(),
            orders: store.clone(),
            notifications: store.clone(),
            conversations: store,
        }
    }
}
