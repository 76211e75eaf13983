//! Handlers for `/orders` and `/downloads`.

use amari_core::error::{CODE_INVALID_ITEMS, CODE_INVALID_STATUS};
use amari_core::orders::{Cart, OrderStatus};
use amari_core::types::DbId;
use amari_db::models::order::{Download, Order, OrderWithItems};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::json_body;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /orders`.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

/// One cart line as sent by the client. `qty` is taken as a raw number so
/// fractional and missing quantities reach cart validation instead of
/// failing deserialization.
#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    #[serde(alias = "listingId")]
    pub listing_id: DbId,
    #[serde(default)]
    pub qty: Option<f64>,
}

/// Body for `POST /orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/orders
///
/// Place an order for the caller. Any authenticated role may buy, including
/// sellers still awaiting approval.
pub async fn place_order(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<OrderWithItems>>)> {
    let input = json_body(payload, CODE_INVALID_ITEMS)?;

    let cart = Cart::from_raw_quantities(input.items.iter().map(|i| (i.listing_id, i.qty)))?;
    let order = state.orders.place_order(session.user_id, &cart).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: order })))
}

/// GET /api/v1/orders
///
/// The caller's orders with item snapshots, newest first.
pub async fn list_orders(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<OrderWithItems>>>> {
    let orders = state.orders.orders_for_user(session.user_id).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// POST /api/v1/orders/{id}/status
///
/// Admin-only status override. Any listed status may be set from any other.
pub async fn update_order_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(order_id): Path<DbId>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<Order>>> {
    let input = json_body(payload, CODE_INVALID_STATUS)?;
    let status: OrderStatus = input.status.trim().parse()?;
    let order = state.orders.update_status(order_id, status).await?;
    tracing::info!(admin_id = admin.user_id, order_id, status = %status, "Admin set order status");
    Ok(Json(DataResponse { data: order }))
}

/// GET /api/v1/downloads
///
/// Digital items the caller has purchased, newest first.
pub async fn list_downloads(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Download>>>> {
    let downloads = state.stores.orders.downloads_for_user(session.user_id).await?;
    Ok(Json(DataResponse { data: downloads }))
}
