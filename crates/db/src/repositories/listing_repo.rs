//! Repository for the `listings` table.

use amari_core::types::DbId;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::models::listing::{CreateListing, Listing, UpdateListing};

/// Column list for `listings` queries.
const COLUMNS: &str =
    "id, seller_id, name, summary, price, format, approved, created_at, updated_at";

/// Catalog access for checkout, seller dashboards and moderation.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Insert an unapproved listing.
    async fn create(&self, input: &CreateListing) -> StoreResult<Listing>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Listing>>;

    /// Batch lookup. Ids with no row are simply absent from the result.
    async fn find_many(&self, ids: &[DbId]) -> StoreResult<Vec<Listing>>;

    /// A seller's listings, newest first.
    async fn list_for_seller(&self, seller_id: DbId) -> StoreResult<Vec<Listing>>;

    /// Listings awaiting moderation, newest first.
    async fn list_pending(&self) -> StoreResult<Vec<Listing>>;

    /// Apply an edit and reset `approved` to `false`.
    async fn update(&self, id: DbId, input: &UpdateListing) -> StoreResult<Option<Listing>>;

    async fn delete(&self, id: DbId) -> StoreResult<bool>;

    async fn approve(&self, id: DbId) -> StoreResult<Option<Listing>>;

    /// Approve every pending listing, returning how many changed.
    async fn approve_all(&self) -> StoreResult<u64>;

    async fn count(&self) -> StoreResult<i64>;
}

/// Postgres implementation of [`ListingStore`].
#[derive(Clone)]
pub struct ListingRepo {
    pool: PgPool,
}

impl ListingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for ListingRepo {
    async fn create(&self, input: &CreateListing) -> StoreResult<Listing> {
        let query = format!(
            "INSERT INTO listings (seller_id, name, summary, price, format, approved)
             VALUES ($1, $2, $3, $4, $5, false)
             RETURNING {COLUMNS}"
        );
        let listing = sqlx::query_as::<_, Listing>(&query)
            .bind(input.seller_id)
            .bind(&input.name)
            .bind(&input.summary)
            .bind(input.price)
            .bind(input.format.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(listing)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Listing>> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE id = $1");
        let listing = sqlx::query_as::<_, Listing>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(listing)
    }

    async fn find_many(&self, ids: &[DbId]) -> StoreResult<Vec<Listing>> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE id = ANY($1)");
        let listings = sqlx::query_as::<_, Listing>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(listings)
    }

    async fn list_for_seller(&self, seller_id: DbId) -> StoreResult<Vec<Listing>> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings
             WHERE seller_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        let listings = sqlx::query_as::<_, Listing>(&query)
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(listings)
    }

    async fn list_pending(&self) -> StoreResult<Vec<Listing>> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings
             WHERE approved = false
             ORDER BY created_at DESC, id DESC"
        );
        let listings = sqlx::query_as::<_, Listing>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(listings)
    }

    async fn update(&self, id: DbId, input: &UpdateListing) -> StoreResult<Option<Listing>> {
        let query = format!(
            "UPDATE listings SET
                name = COALESCE($2, name),
                summary = COALESCE($3, summary),
                price = COALESCE($4, price),
                format = COALESCE($5, format),
                approved = false,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let listing = sqlx::query_as::<_, Listing>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.summary)
            .bind(input.price)
            .bind(input.format.map(|f| f.as_str()))
            .fetch_optional(&self.pool)
            .await?;
        Ok(listing)
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn approve(&self, id: DbId) -> StoreResult<Option<Listing>> {
        let query = format!(
            "UPDATE listings SET approved = true, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let listing = sqlx::query_as::<_, Listing>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(listing)
    }

    async fn approve_all(&self) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE listings SET approved = true, updated_at = NOW() WHERE approved = false",
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
