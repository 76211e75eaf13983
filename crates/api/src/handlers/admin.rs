//! Admin-only handlers: user and seller review, listing moderation, and
//! dashboard counts.

use amari_core::error::CoreError;
use amari_core::roles::SellerStatus;
use amari_core::types::DbId;
use amari_db::models::listing::Listing;
use amari_db::models::user::User;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Counts {
    pub users: i64,
    pub listings: i64,
    pub orders: i64,
}

#[derive(Debug, Serialize)]
pub struct ModerateResponse {
    pub approved: u64,
}

// ---------------------------------------------------------------------------
// Users and sellers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    let users = state.stores.users.list().await?;
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/admin/sellers
///
/// Sellers waiting for a decision.
pub async fn list_pending_sellers(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    let users = state.stores.users.list_pending_sellers().await?;
    Ok(Json(DataResponse { data: users }))
}

/// POST /api/v1/admin/sellers/{id}/approve
pub async fn approve_seller(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<User>>> {
    decide_seller(&state, admin.user_id, user_id, SellerStatus::Approved).await
}

/// POST /api/v1/admin/sellers/{id}/reject
pub async fn reject_seller(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<User>>> {
    decide_seller(&state, admin.user_id, user_id, SellerStatus::Rejected).await
}

async fn decide_seller(
    state: &AppState,
    admin_id: DbId,
    user_id: DbId,
    status: SellerStatus,
) -> AppResult<Json<DataResponse<User>>> {
    let user = state
        .stores
        .users
        .set_seller_status(user_id, status)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: user_id,
        })?;
    tracing::info!(admin_id, user_id, seller_status = %status, "Seller status set");

    let (title, body) = match status {
        SellerStatus::Approved => (
            "Seller access approved",
            "You can now publish listings.",
        ),
        _ => (
            "Seller access rejected",
            "Your seller request was not approved.",
        ),
    };
    state
        .notifications
        .notify(user.id, title, Some(body.to_string()))
        .await;

    Ok(Json(DataResponse { data: user }))
}

// ---------------------------------------------------------------------------
// Listing moderation
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/listings/pending
pub async fn list_pending_listings(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Listing>>>> {
    let listings = state.stores.listings.list_pending().await?;
    Ok(Json(DataResponse { data: listings }))
}

/// POST /api/v1/admin/listings/{id}/approve
pub async fn approve_listing(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Listing>>> {
    let listing = state
        .stores
        .listings
        .approve(listing_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Listing",
            id: listing_id,
        })?;
    tracing::info!(admin_id = admin.user_id, listing_id, "Listing approved");
    Ok(Json(DataResponse { data: listing }))
}

/// POST /api/v1/admin/moderate
///
/// Approve every pending listing at once.
pub async fn moderate_all(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ModerateResponse>>> {
    let approved = state.stores.listings.approve_all().await?;
    tracing::info!(admin_id = admin.user_id, approved, "Bulk-approved pending listings");
    Ok(Json(DataResponse {
        data: ModerateResponse { approved },
    }))
}

/// GET /api/v1/admin/counts
pub async fn counts(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Counts>>> {
    let users = state.stores.users.count().await?;
    let listings = state.stores.listings.count().await?;
    let orders = state.stores.orders.count().await?;
    Ok(Json(DataResponse {
        data: Counts {
            users,
            listings,
            orders,
        },
    }))
}
