//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication and only ever touch the caller's
//! own notifications.

use amari_core::types::DbId;
use amari_db::models::notification::Notification;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::{Ack, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response for `GET /notifications`.
#[derive(Debug, Serialize)]
pub struct NotificationList {
    pub data: Vec<Notification>,
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
///
/// The caller's notifications, newest first, with the unread count.
pub async fn list_notifications(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<NotificationList>> {
    let data = state.notifications.list(session.user_id).await?;
    let unread = data.iter().filter(|n| !n.is_read()).count() as i64;
    Ok(Json(NotificationList { data, unread }))
}

/// PATCH /api/v1/notifications/{id}
///
/// Mark one notification read. Always acknowledges: ids that are unknown or
/// owned by someone else are a silent no-op.
pub async fn mark_read(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Ack>>> {
    state
        .notifications
        .mark_read(session.user_id, notification_id)
        .await?;
    Ok(Json(Ack::ok()))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let count = state.notifications.unread_count(session.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { count },
    }))
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MarkAllReadResponse>>> {
    let updated = state.notifications.mark_all_read(session.user_id).await?;
    tracing::debug!(user_id = session.user_id, updated, "Marked all notifications read");
    Ok(Json(DataResponse {
        data: MarkAllReadResponse { updated },
    }))
}
