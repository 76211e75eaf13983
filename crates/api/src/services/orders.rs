//! Checkout and order administration.

use std::sync::Arc;

use amari_core::error::CoreError;
use amari_core::orders::{price_cart, Cart, OrderStatus};
use amari_core::types::DbId;
use amari_db::models::order::{NewOrder, Order, OrderWithItems};
use amari_db::repositories::{ListingStore, OrderStore};

use super::NotificationService;
use crate::error::AppResult;

#[derive(Clone)]
pub struct OrderService {
    listings: Arc<dyn ListingStore>,
    orders: Arc<dyn OrderStore>,
    notifications: NotificationService,
}

impl OrderService {
    pub fn new(
        listings: Arc<dyn ListingStore>,
        orders: Arc<dyn OrderStore>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            listings,
            orders,
            notifications,
        }
    }

    /// Place an order for `user_id`.
    ///
    /// Every listing in the cart is resolved in one batch; if any is missing
    /// nothing is written. Prices and formats are frozen into the item rows,
    /// the header and items are inserted atomically, and then the buyer and
    /// each distinct seller are notified.
    pub async fn place_order(&self, user_id: DbId, cart: &Cart) -> AppResult<OrderWithItems> {
        let listings = self.listings.find_many(&cart.listing_ids()).await?;
        let snapshots: Vec<_> = listings.iter().map(|l| l.snapshot()).collect();
        let draft = price_cart(cart, &snapshots)?;

        let placed = self.orders.create(&NewOrder::from_draft(user_id, &draft)).await?;
        let order = &placed.order;
        tracing::info!(
            user_id,
            order_id = order.id,
            total = %order.total,
            status = %order.status,
            items = placed.items.len(),
            "Order placed"
        );

        self.notifications
            .notify(
                user_id,
                "Order placed",
                Some(format!(
                    "Order #{} placed. Total {}, status {}.",
                    order.id, order.total, order.status
                )),
            )
            .await;
        self.notifications
            .notify_all(
                &draft.seller_ids,
                "New order",
                Some(format!("An item in order #{} includes your listing.", order.id)),
            )
            .await;

        Ok(placed)
    }

    /// Overwrite an order's status and tell the buyer.
    ///
    /// Any status may follow any other; there is no transition table.
    pub async fn update_status(&self, order_id: DbId, status: OrderStatus) -> AppResult<Order> {
        let order = self
            .orders
            .update_status(order_id, status)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Order",
                id: order_id,
            })?;
        tracing::info!(order_id, status = %status, "Order status updated");

        self.notifications
            .notify(
                order.user_id,
                "Order updated",
                Some(format!("Order #{} is now {}.", order.id, order.status)),
            )
            .await;

        Ok(order)
    }

    /// The user's orders with their item snapshots, newest first.
    pub async fn orders_for_user(&self, user_id: DbId) -> AppResult<Vec<OrderWithItems>> {
        Ok(self.orders.list_for_user(user_id).await?)
    }
}
