//! Repository for the `notifications` table.

use amari_core::types::DbId;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::models::notification::{CreateNotification, Notification};

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, title, body, read_at, created_at";

/// Per-user notification inbox.
///
/// Every mutation is scoped to the owning user in its `WHERE` clause, so a
/// caller can never touch another user's rows.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Insert a single unread notification.
    async fn create(&self, input: &CreateNotification) -> StoreResult<Notification>;

    /// All notifications owned by the user, newest first.
    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<Notification>>;

    /// Mark one notification read. Returns `false` when no unread row matched
    /// `(id, user_id)`.
    async fn mark_read(&self, id: DbId, user_id: DbId) -> StoreResult<bool>;

    /// Mark all unread notifications for a user as read.
    async fn mark_all_read(&self, user_id: DbId) -> StoreResult<u64>;

    async fn unread_count(&self, user_id: DbId) -> StoreResult<i64>;
}

/// Postgres implementation of [`NotificationStore`].
#[derive(Clone)]
pub struct NotificationRepo {
    pool: PgPool,
}

impl NotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepo {
    async fn create(&self, input: &CreateNotification) -> StoreResult<Notification> {
        let query = format!(
            "INSERT INTO notifications (user_id, title, body)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let notification = sqlx::query_as::<_, Notification>(&query)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.body)
            .fetch_one(&self.pool)
            .await?;
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<Notification>> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        let notifications = sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(notifications)
    }

    async fn mark_read(&self, id: DbId, user_id: DbId) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW()
             WHERE id = $1 AND user_id = $2 AND read_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: DbId) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW()
             WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn unread_count(&self, user_id: DbId) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
