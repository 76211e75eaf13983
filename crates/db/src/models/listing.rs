//! Listing (magazine issue) entity model and DTOs.

use amari_core::catalog::ListingFormat;
use amari_core::orders::ListingSnapshot;
use amari_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `listings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Listing {
    pub id: DbId,
    pub seller_id: DbId,
    pub name: String,
    pub summary: Option<String>,
    pub price: Money,
    #[sqlx(try_from = "String")]
    pub format: ListingFormat,
    pub approved: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Listing {
    /// The fields checkout freezes into an order line.
    pub fn snapshot(&self) -> ListingSnapshot {
        ListingSnapshot {
            listing_id: self.id,
            seller_id: self.seller_id,
            price: self.price,
            format: self.format,
        }
    }
}

/// DTO for creating a listing. New listings always start unapproved.
#[derive(Debug, Clone)]
pub struct CreateListing {
    pub seller_id: DbId,
    pub name: String,
    pub summary: Option<String>,
    pub price: Money,
    pub format: ListingFormat,
}

/// DTO for editing a listing. Only non-`None` fields are applied; any edit
/// sends the listing back to moderation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateListing {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub price: Option<Money>,
    pub format: Option<ListingFormat>,
}
