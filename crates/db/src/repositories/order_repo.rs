//! Repository for the `orders` and `order_items` tables.

use std::collections::HashMap;

use amari_core::catalog::FORMAT_DIGITAL;
use amari_core::orders::OrderStatus;
use amari_core::types::{DbId, Timestamp};
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::models::order::{Download, MonthlyTotal, NewOrder, Order, OrderItem, OrderWithItems};

/// Column list for `orders` queries.
const COLUMNS: &str = "id, user_id, status, total, created_at";

/// Column list for `order_items` queries.
const ITEM_COLUMNS: &str = "id, order_id, listing_id, qty, price, format";

/// Order persistence. Headers and items are only ever written together.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert the header and every item row as one atomic unit.
    async fn create(&self, input: &NewOrder) -> StoreResult<OrderWithItems>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Order>>;

    /// A user's orders with their items, newest first.
    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<OrderWithItems>>;

    /// Overwrite the status. No transition rules are applied.
    async fn update_status(&self, id: DbId, status: OrderStatus) -> StoreResult<Option<Order>>;

    /// Digital items the user has bought, newest first.
    async fn downloads_for_user(&self, user_id: DbId) -> StoreResult<Vec<Download>>;

    /// Per-month sales of a seller's listings since `since`, keyed `YYYY-MM`.
    /// Months without sales are absent.
    async fn seller_monthly_sales(
        &self,
        seller_id: DbId,
        since: Timestamp,
    ) -> StoreResult<Vec<MonthlyTotal>>;

    async fn count(&self) -> StoreResult<i64>;
}

/// Postgres implementation of [`OrderStore`].
#[derive(Clone)]
pub struct OrderRepo {
    pool: PgPool,
}

impl OrderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn items_for_orders(&self, order_ids: &[DbId]) -> StoreResult<Vec<OrderItem>> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items
             WHERE order_id = ANY($1)
             ORDER BY order_id, id"
        );
        let items = sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }
}

#[async_trait]
impl OrderStore for OrderRepo {
    async fn create(&self, input: &NewOrder) -> StoreResult<OrderWithItems> {
        let mut tx = self.pool.begin().await?;

        let header_query = format!(
            "INSERT INTO orders (user_id, status, total)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&header_query)
            .bind(input.user_id)
            .bind(input.status.as_str())
            .bind(input.total)
            .fetch_one(&mut *tx)
            .await?;

        let item_query = format!(
            "INSERT INTO order_items (order_id, listing_id, qty, price, format)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ITEM_COLUMNS}"
        );
        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let item = sqlx::query_as::<_, OrderItem>(&item_query)
                .bind(order.id)
                .bind(line.listing_id)
                .bind(line.qty)
                .bind(line.price)
                .bind(line.format.as_str())
                .fetch_one(&mut *tx)
                .await?;
            items.push(item);
        }

        tx.commit().await?;
        Ok(OrderWithItems { order, items })
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Order>> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<OrderWithItems>> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<DbId> = orders.iter().map(|o| o.id).collect();
        let mut by_order: HashMap<DbId, Vec<OrderItem>> = HashMap::new();
        for item in self.items_for_orders(&ids).await? {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect())
    }

    async fn update_status(&self, id: DbId, status: OrderStatus) -> StoreResult<Option<Order>> {
        let query = format!(
            "UPDATE orders SET status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn downloads_for_user(&self, user_id: DbId) -> StoreResult<Vec<Download>> {
        let downloads = sqlx::query_as::<_, Download>(
            "SELECT oi.listing_id, o.id AS order_id, o.created_at AS purchased_at
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             WHERE o.user_id = $1 AND oi.format = $2
             ORDER BY o.created_at DESC, oi.id DESC",
        )
        .bind(user_id)
        .bind(FORMAT_DIGITAL)
        .fetch_all(&self.pool)
        .await?;
        Ok(downloads)
    }

    async fn seller_monthly_sales(
        &self,
        seller_id: DbId,
        since: Timestamp,
    ) -> StoreResult<Vec<MonthlyTotal>> {
        let totals = sqlx::query_as::<_, MonthlyTotal>(
            "SELECT to_char(date_trunc('month', o.created_at), 'YYYY-MM') AS month,
                    SUM(oi.price * oi.qty) AS sales
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             JOIN listings l ON l.id = oi.listing_id
             WHERE l.seller_id = $1 AND o.created_at >= $2
             GROUP BY 1
             ORDER BY 1",
        )
        .bind(seller_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(totals)
    }

    async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
