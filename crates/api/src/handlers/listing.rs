//! Handlers for seller listing management and seller analytics.
//!
//! `/seller/*` routes require an approved seller. `PATCH`/`DELETE
//! /listings/{id}` also admit admins; a seller may only touch their own
//! listings.

use amari_core::access::Session;
use amari_core::analytics::{fill_months, month_start, MonthlySales, ANALYTICS_MONTHS};
use amari_core::catalog::{validate_listing_name, validate_price, ListingFormat};
use amari_core::error::{CoreError, CODE_VALIDATION};
use amari_core::roles::Role;
use amari_core::types::{DbId, Money};
use amari_db::models::listing::{CreateListing, Listing, UpdateListing};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveTime, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::json_body;
use crate::middleware::rbac::{RequireSeller, RequireSellerOrAdmin};
use crate::response::{Ack, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /seller/listings`.
#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub price: Money,
    pub format: String,
}

/// Body for `PATCH /listings/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateListingRequest {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub price: Option<Money>,
    pub format: Option<String>,
}

impl UpdateListingRequest {
    fn validate(self) -> Result<UpdateListing, CoreError> {
        if let Some(name) = &self.name {
            validate_listing_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        let format = self
            .format
            .as_deref()
            .map(str::parse::<ListingFormat>)
            .transpose()?;
        Ok(UpdateListing {
            name: self.name.map(|n| n.trim().to_string()),
            summary: self.summary,
            price: self.price,
            format,
        })
    }
}

/// Load a listing and check the caller may modify it.
async fn owned_listing(state: &AppState, session: &Session, id: DbId) -> AppResult<Listing> {
    let listing = state
        .stores
        .listings
        .find_by_id(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Listing",
            id,
        })?;
    if session.role != Role::Admin && listing.seller_id != session.user_id {
        return Err(CoreError::Forbidden("You can only modify your own listings".into()).into());
    }
    Ok(listing)
}

// ---------------------------------------------------------------------------
// Seller listings
// ---------------------------------------------------------------------------

/// GET /api/v1/seller/listings
pub async fn list_my_listings(
    RequireSeller(session): RequireSeller,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Listing>>>> {
    let listings = state.stores.listings.list_for_seller(session.user_id).await?;
    Ok(Json(DataResponse { data: listings }))
}

/// POST /api/v1/seller/listings
///
/// New listings start unapproved and wait for moderation.
pub async fn create_listing(
    RequireSeller(session): RequireSeller,
    State(state): State<AppState>,
    payload: Result<Json<CreateListingRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<Listing>>)> {
    let input = json_body(payload, CODE_VALIDATION)?;
    validate_listing_name(&input.name)?;
    validate_price(input.price)?;
    let format: ListingFormat = input.format.parse()?;

    let listing = state
        .stores
        .listings
        .create(&CreateListing {
            seller_id: session.user_id,
            name: input.name.trim().to_string(),
            summary: input.summary,
            price: input.price,
            format,
        })
        .await?;
    tracing::info!(seller_id = session.user_id, listing_id = listing.id, "Listing created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: listing })))
}

/// PATCH /api/v1/listings/{id}
///
/// Any edit sends the listing back to moderation.
pub async fn update_listing(
    RequireSellerOrAdmin(session): RequireSellerOrAdmin,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
    payload: Result<Json<UpdateListingRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<Listing>>> {
    let input = json_body(payload, CODE_VALIDATION)?;
    let update = input.validate()?;
    owned_listing(&state, &session, listing_id).await?;

    let listing = state
        .stores
        .listings
        .update(listing_id, &update)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Listing",
            id: listing_id,
        })?;
    tracing::info!(user_id = session.user_id, listing_id, "Listing updated, approval reset");

    Ok(Json(DataResponse { data: listing }))
}

/// DELETE /api/v1/listings/{id}
pub async fn delete_listing(
    RequireSellerOrAdmin(session): RequireSellerOrAdmin,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Ack>>> {
    owned_listing(&state, &session, listing_id).await?;
    state.stores.listings.delete(listing_id).await?;
    tracing::info!(user_id = session.user_id, listing_id, "Listing deleted");
    Ok(Json(Ack::ok()))
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// GET /api/v1/seller/analytics
///
/// Sales of the caller's listings per calendar month, for the current month
/// and the five before it, oldest first. Months without sales report zero.
pub async fn sales_analytics(
    RequireSeller(session): RequireSeller,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<MonthlySales>>>> {
    let now = Utc::now();
    let since = month_start(now, ANALYTICS_MONTHS - 1)
        .and_time(NaiveTime::MIN)
        .and_utc();

    let rows: Vec<(String, Money)> = state
        .stores
        .orders
        .seller_monthly_sales(session.user_id, since)
        .await?
        .into_iter()
        .map(|row| (row.month, row.sales))
        .collect();

    Ok(Json(DataResponse {
        data: fill_months(now, ANALYTICS_MONTHS, &rows),
    }))
}
