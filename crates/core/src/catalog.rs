//! Listing formats and listing input validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CODE_VALIDATION};
use crate::types::Money;

pub const FORMAT_PRINT: &str = "print";
pub const FORMAT_DIGITAL: &str = "digital";

/// Maximum length of a listing name, in characters.
pub const MAX_LISTING_NAME_LEN: usize = 200;

/// Exclusive upper bound on any stored amount, listing prices and order
/// totals alike. Amounts are stored as `NUMERIC(12,2)`.
pub fn amount_limit() -> Money {
    Money::new(10_000_000_000, 0)
}

/// How a magazine issue is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingFormat {
    Print,
    Digital,
}

impl ListingFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingFormat::Print => FORMAT_PRINT,
            ListingFormat::Digital => FORMAT_DIGITAL,
        }
    }
}

impl fmt::Display for ListingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            FORMAT_PRINT => Ok(ListingFormat::Print),
            FORMAT_DIGITAL => Ok(ListingFormat::Digital),
            other => Err(CoreError::validation(
                CODE_VALIDATION,
                format!("Unknown listing format '{other}'. Must be one of: print, digital"),
            )),
        }
    }
}

impl TryFrom<String> for ListingFormat {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A listing price must be strictly positive and have at most two decimal
/// places.
pub fn validate_price(price: Money) -> Result<(), CoreError> {
    if price <= Money::ZERO {
        return Err(CoreError::validation(
            CODE_VALIDATION,
            "Price must be greater than zero",
        ));
    }
    if price >= amount_limit() {
        return Err(CoreError::validation(
            CODE_VALIDATION,
            format!("Price must be less than {}", amount_limit()),
        ));
    }
    if price.normalize().scale() > 2 {
        return Err(CoreError::validation(
            CODE_VALIDATION,
            "Price must have at most two decimal places",
        ));
    }
    Ok(())
}

/// A listing name must be non-blank and at most [`MAX_LISTING_NAME_LEN`]
/// characters.
pub fn validate_listing_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(CODE_VALIDATION, "Name must not be empty"));
    }
    if trimmed.chars().count() > MAX_LISTING_NAME_LEN {
        return Err(CoreError::validation(
            CODE_VALIDATION,
            format!("Name must be at most {MAX_LISTING_NAME_LEN} characters"),
        ));
    }
    Ok(())
}
