//! Handlers for the `/auth` resource: session introspection and the
//! "become a seller" request.

use amari_core::error::CoreError;
use amari_core::roles::{Role, SellerStatus};
use amari_core::types::DbId;
use amari_db::models::user::User;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: DbId,
    pub role: Role,
    /// From the user record when it could be read, otherwise the session hint.
    pub seller_status: SellerStatus,
    pub user: Option<User>,
}

/// Response for `POST /auth/become-seller`.
#[derive(Debug, Serialize)]
pub struct BecomeSellerResponse {
    pub role: Role,
    pub seller_status: SellerStatus,
}

/// GET /api/v1/auth/me
///
/// The session claims, enriched with the stored user record. A failed store
/// read degrades to the claims alone.
pub async fn me(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MeResponse>>> {
    let user = match state.stores.users.find_by_id(session.user_id).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(user_id = session.user_id, error = %e, "User lookup failed for /auth/me");
            None
        }
    };

    let data = match &user {
        Some(u) => MeResponse {
            user_id: session.user_id,
            role: u.role,
            seller_status: u.seller_status,
            user: user.clone(),
        },
        None => MeResponse {
            user_id: session.user_id,
            role: session.role,
            seller_status: session.status_hint(),
            user: None,
        },
    };
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/auth/become-seller
///
/// Switch the caller to the seller role and queue them for approval (an
/// already-approved seller stays approved). Every admin is notified.
pub async fn become_seller(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BecomeSellerResponse>>> {
    let user = state
        .stores
        .users
        .request_seller_access(session.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: session.user_id,
        })?;

    tracing::info!(
        user_id = user.id,
        seller_status = %user.seller_status,
        "Seller access requested"
    );

    match state.stores.users.list_admin_ids().await {
        Ok(admins) => {
            state
                .notifications
                .notify_all(
                    &admins,
                    "Seller access requested",
                    Some(format!("{} ({}) requested seller access.", user.name, user.email)),
                )
                .await;
        }
        Err(e) => {
            tracing::warn!(user_id = user.id, error = %e, "Could not load admins to notify");
        }
    }

    Ok(Json(DataResponse {
        data: BecomeSellerResponse {
            role: user.role,
            seller_status: user.seller_status,
        },
    }))
}
