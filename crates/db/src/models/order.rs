//! Order and order item models.

use amari_core::catalog::ListingFormat;
use amari_core::orders::{OrderDraft, OrderStatus, PricedLine};
use amari_core::types::{DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub user_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub total: Money,
    pub created_at: Timestamp,
}

/// A row from the `order_items` table: the price and format as they were at
/// checkout.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: DbId,
    pub order_id: DbId,
    pub listing_id: DbId,
    pub qty: i32,
    pub price: Money,
    #[sqlx(try_from = "String")]
    pub format: ListingFormat,
}

/// An order header with its item snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Everything needed to insert an order header and its items in one
/// transaction.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: DbId,
    pub status: OrderStatus,
    pub total: Money,
    pub items: Vec<PricedLine>,
}

impl NewOrder {
    pub fn from_draft(user_id: DbId, draft: &OrderDraft) -> Self {
        Self {
            user_id,
            status: draft.status,
            total: draft.total,
            items: draft.lines.clone(),
        }
    }
}

/// A digital item the user has purchased.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Download {
    pub listing_id: DbId,
    pub order_id: DbId,
    pub purchased_at: Timestamp,
}

/// Sales total for one `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct MonthlyTotal {
    pub month: String,
    pub sales: Money,
}
