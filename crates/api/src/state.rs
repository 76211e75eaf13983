use std::sync::Arc;

use amari_db::Stores;

use crate::auth::guard::AuthorizationGuard;
use crate::config::ServerConfig;
use crate::services::{ConversationService, NotificationService, OrderService};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Store implementations (Postgres or in-memory).
    pub stores: Stores,
    /// Server configuration (JWT settings are read by the auth extractors).
    pub config: Arc<ServerConfig>,
    pub guard: AuthorizationGuard,
    pub notifications: NotificationService,
    pub orders: OrderService,
    pub conversations: ConversationService,
}

impl AppState {
    /// Wire the services on top of `stores`.
    pub fn new(stores: Stores, config: Arc<ServerConfig>) -> Self {
        let notifications = NotificationService::new(stores.notifications.clone());
        let orders = OrderService::new(
            stores.listings.clone(),
            stores.orders.clone(),
            notifications.clone(),
        );
        let conversations = ConversationService::new(
            stores.conversations.clone(),
            stores.users.clone(),
            notifications.clone(),
        );
        let guard = AuthorizationGuard::from_users(stores.users.clone());

        Self {
            stores,
            config,
            guard,
            notifications,
            orders,
            conversations,
        }
    }
}
