//! Roles and seller approval states.
//!
//! Both are stored as lowercase `TEXT` columns; the string constants below are
//! the canonical spellings used by the migrations and the session claims.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CODE_VALIDATION};

pub const ROLE_BUYER: &str = "buyer";
pub const ROLE_SELLER: &str = "seller";
pub const ROLE_ADMIN: &str = "admin";

pub const SELLER_STATUS_NONE: &str = "none";
pub const SELLER_STATUS_PENDING: &str = "pending";
pub const SELLER_STATUS_APPROVED: &str = "approved";
pub const SELLER_STATUS_REJECTED: &str = "rejected";

/// A user's primary role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl Role {
    /// Every role. Routes open to all authenticated users require this set.
    pub const ALL: &'static [Role] = &[Role::Buyer, Role::Seller, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Buyer => ROLE_BUYER,
            Role::Seller => ROLE_SELLER,
            Role::Admin => ROLE_ADMIN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_BUYER => Ok(Role::Buyer),
            ROLE_SELLER => Ok(Role::Seller),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(CoreError::validation(
                CODE_VALIDATION,
                format!("Unknown role '{other}'"),
            )),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Admin-granted approval state. Only meaningful for users whose role is
/// [`Role::Seller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerStatus {
    #[default]
    None,
    Pending,
    Approved,
    Rejected,
}

impl SellerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SellerStatus::None => SELLER_STATUS_NONE,
            SellerStatus::Pending => SELLER_STATUS_PENDING,
            SellerStatus::Approved => SELLER_STATUS_APPROVED,
            SellerStatus::Rejected => SELLER_STATUS_REJECTED,
        }
    }

    pub fn is_approved(self) -> bool {
        self == SellerStatus::Approved
    }

    /// The status a user moves to when they ask for seller access.
    ///
    /// An already-approved seller keeps the approval; everyone else goes back
    /// into the review queue.
    pub fn after_seller_request(self) -> SellerStatus {
        match self {
            SellerStatus::Approved => SellerStatus::Approved,
            _ => SellerStatus::Pending,
        }
    }
}

impl fmt::Display for SellerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SellerStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SELLER_STATUS_NONE => Ok(SellerStatus::None),
            SELLER_STATUS_PENDING => Ok(SellerStatus::Pending),
            SELLER_STATUS_APPROVED => Ok(SellerStatus::Approved),
            SELLER_STATUS_REJECTED => Ok(SellerStatus::Rejected),
            other => Err(CoreError::validation(
                CODE_VALIDATION,
                format!("Unknown seller status '{other}'"),
            )),
        }
    }
}

impl TryFrom<String> for SellerStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
