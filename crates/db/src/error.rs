/// Errors raised by store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The Postgres driver failed (connection, query, decode).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backing store cannot serve the request right now.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Convenience alias for store method results.
pub type StoreResult<T> = Result<T, StoreError>;
