use crate::types::DbId;

// ---------------------------------------------------------------------------
// Stable error codes
// ---------------------------------------------------------------------------

/// The cart submitted for checkout has no items.
pub const CODE_EMPTY_CART: &str = "EMPTY_CART";

/// At least one cart line has a missing, zero, negative, fractional or
/// non-finite quantity.
pub const CODE_INVALID_ITEMS: &str = "INVALID_ITEMS";

/// An order status value outside the enumerated set.
pub const CODE_INVALID_STATUS: &str = "INVALID_STATUS";

/// A chat message that is empty after trimming.
pub const CODE_EMPTY_MESSAGE: &str = "EMPTY_MESSAGE";

/// Generic input validation failure.
pub const CODE_VALIDATION: &str = "VALIDATION_ERROR";

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// One or more cart lines reference listings that do not exist.
    #[error("Listings not found: {ids:?}")]
    ListingNotFound { ids: Vec<DbId> },

    #[error("Validation failed ({code}): {message}")]
    Validation { code: &'static str, message: String },

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::Validation`] with the given stable code.
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }
}
