//! Repository for the `users` table.

use amari_core::roles::{Role, SellerStatus, ROLE_ADMIN, ROLE_SELLER, SELLER_STATUS_PENDING};
use amari_core::types::DbId;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, role, seller_status, created_at, updated_at";

/// User lookups and seller-approval mutations.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, input: &CreateUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<User>>;

    /// The stored seller status, `None` when the user does not exist.
    async fn seller_status(&self, id: DbId) -> StoreResult<Option<SellerStatus>>;

    /// All users, newest first.
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Sellers awaiting approval, newest first.
    async fn list_pending_sellers(&self) -> StoreResult<Vec<User>>;

    async fn list_admin_ids(&self) -> StoreResult<Vec<DbId>>;

    /// Switch the user to the seller role. The seller status becomes
    /// `pending` unless it is already `approved`.
    async fn request_seller_access(&self, id: DbId) -> StoreResult<Option<User>>;

    async fn set_seller_status(&self, id: DbId, status: SellerStatus)
        -> StoreResult<Option<User>>;

    async fn count(&self) -> StoreResult<i64>;
}

/// Postgres implementation of [`UserStore`].
#[derive(Clone)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepo {
    async fn create(&self, input: &CreateUser) -> StoreResult<User> {
        let query = format!(
            "INSERT INTO users (name, email, role, seller_status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.role.as_str())
            .bind(input.seller_status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn seller_status(&self, id: DbId) -> StoreResult<Option<SellerStatus>> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT seller_status FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        // A value outside the CHECK constraint cannot be stored; treat an
        // unparseable one as "not approved".
        Ok(raw.map(|s| s.parse().unwrap_or_default()))
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_pending_sellers(&self) -> StoreResult<Vec<User>> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE role = $1 AND seller_status = $2
             ORDER BY created_at DESC, id DESC"
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(ROLE_SELLER)
            .bind(SELLER_STATUS_PENDING)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_admin_ids(&self) -> StoreResult<Vec<DbId>> {
        let ids = sqlx::query_scalar("SELECT id FROM users WHERE role = $1 ORDER BY id")
            .bind(ROLE_ADMIN)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn request_seller_access(&self, id: DbId) -> StoreResult<Option<User>> {
        let query = format!(
            "UPDATE users SET
                role = $2,
                seller_status = CASE WHEN seller_status = 'approved'
                                     THEN seller_status ELSE $3 END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(Role::Seller.as_str())
            .bind(SELLER_STATUS_PENDING)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn set_seller_status(
        &self,
        id: DbId,
        status: SellerStatus,
    ) -> StoreResult<Option<User>> {
        let query = format!(
            "UPDATE users SET seller_status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
