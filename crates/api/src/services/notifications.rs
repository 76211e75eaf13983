//! Per-user notifications.

use std::sync::Arc;

use amari_core::types::DbId;
use amari_db::models::notification::{CreateNotification, Notification};
use amari_db::repositories::NotificationStore;

use crate::error::AppResult;

/// Writes and reads notifications.
///
/// [`notify`](Self::notify) is best-effort: a failed insert is logged and
/// swallowed so the operation that triggered it still succeeds.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Insert an unread notification for `user_id`. Returns `None` when the
    /// write failed.
    pub async fn notify(
        &self,
        user_id: DbId,
        title: &str,
        body: Option<String>,
    ) -> Option<Notification> {
        let input = CreateNotification {
            user_id,
            title: title.to_string(),
            body,
        };
        match self.store.create(&input).await {
            Ok(notification) => Some(notification),
            Err(e) => {
                tracing::warn!(user_id, title, error = %e, "Failed to deliver notification");
                None
            }
        }
    }

    /// Send the same notification to each recipient, once per distinct id.
    /// Returns how many were written.
    pub async fn notify_all(&self, user_ids: &[DbId], title: &str, body: Option<String>) -> usize {
        let mut seen = Vec::with_capacity(user_ids.len());
        let mut delivered = 0;
        for &user_id in user_ids {
            if seen.contains(&user_id) {
                continue;
            }
            seen.push(user_id);
            if self.notify(user_id, title, body.clone()).await.is_some() {
                delivered += 1;
            }
        }
        delivered
    }

    /// The user's notifications, newest first.
    pub async fn list(&self, user_id: DbId) -> AppResult<Vec<Notification>> {
        Ok(self.store.list_for_user(user_id).await?)
    }

    /// Mark a notification read. Notifications owned by someone else, and
    /// unknown ids, are left untouched without error.
    pub async fn mark_read(&self, user_id: DbId, id: DbId) -> AppResult<()> {
        let updated = self.store.mark_read(id, user_id).await?;
        if !updated {
            tracing::debug!(user_id, notification_id = id, "mark_read matched no unread row");
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: DbId) -> AppResult<u64> {
        Ok(self.store.mark_all_read(user_id).await?)
    }

    pub async fn unread_count(&self, user_id: DbId) -> AppResult<i64> {
        Ok(self.store.unread_count(user_id).await?)
    }
}
