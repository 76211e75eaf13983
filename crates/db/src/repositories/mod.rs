//! Repository layer.
//!
//! Each table group has a store trait (`*Store`) describing the operations
//! the services need, and a Postgres implementation (`*Repo`) that owns a
//! clone of the pool. The in-memory implementation of every trait lives in
//! [`crate::memory`].

pub mod conversation_repo;
pub mod listing_repo;
pub mod notification_repo;
pub mod order_repo;
pub mod user_repo;

pub use conversation_repo::{ConversationRepo, ConversationStore};
pub use listing_repo::{ListingRepo, ListingStore};
pub use notification_repo::{NotificationRepo, NotificationStore};
pub use order_repo::{OrderRepo, OrderStore};
pub use user_repo::{UserRepo, UserStore};
