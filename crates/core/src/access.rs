//! Authorization decision rules.
//!
//! The decision is split into two pure steps so the caller can perform the
//! (fallible, asynchronous) seller-status lookup in between:
//!
//! 1. [`check_role`]: is there a session, and is its role in the required set?
//! 2. [`check_approval`]: when [`needs_approval_check`] says so, is the
//!    resolved seller status `approved`?
//!
//! Approval only gates seller-exclusive routes (the required set contains
//! `seller` but not `buyer`). Routes shared with buyers never look at the
//! approval state, so a pending seller can still shop, chat, and read
//! notifications.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::{Role, SellerStatus};
use crate::types::DbId;

/// Point-in-time copy of the caller's identity, as carried by the session
/// token. `seller_status` is a hint and may be stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: DbId,
    pub role: Role,
    pub seller_status: Option<SellerStatus>,
}

impl Session {
    /// The seller status claimed by the session, `none` when absent.
    pub fn status_hint(&self) -> SellerStatus {
        self.seller_status.unwrap_or_default()
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Forbidden,
}

impl From<Denial> for CoreError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => CoreError::Unauthenticated("Authentication required".into()),
            Denial::Forbidden => CoreError::Forbidden("Insufficient permissions".into()),
        }
    }
}

/// Where a resolved seller status was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    /// The authoritative user store.
    Store,
    /// The session claims, used when the store could not be read.
    SessionHint,
}

/// A seller status together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStatus {
    pub status: SellerStatus,
    pub source: StatusSource,
}

impl ResolvedStatus {
    pub fn from_store(status: SellerStatus) -> Self {
        Self {
            status,
            source: StatusSource::Store,
        }
    }

    pub fn from_session(session: &Session) -> Self {
        Self {
            status: session.status_hint(),
            source: StatusSource::SessionHint,
        }
    }
}

/// `true` when the required role set is seller-exclusive (contains `seller`,
/// does not contain `buyer`).
pub fn requires_approval(required: &[Role]) -> bool {
    required.contains(&Role::Seller) && !required.contains(&Role::Buyer)
}

/// Step 1: session presence and role membership.
pub fn check_role<'a>(
    required: &[Role],
    session: Option<&'a Session>,
) -> Result<&'a Session, Denial> {
    let session = session.ok_or(Denial::Unauthenticated)?;
    if !required.contains(&session.role) {
        return Err(Denial::Forbidden);
    }
    Ok(session)
}

/// Whether the seller-status lookup must run for this caller on this route.
///
/// Only sessions whose role is `seller` carry an approval state; admins on a
/// seller+admin route pass on role alone.
pub fn needs_approval_check(required: &[Role], session: &Session) -> bool {
    session.role == Role::Seller && requires_approval(required)
}

/// Step 2: approval gate.
pub fn check_approval(resolved: ResolvedStatus) -> Result<(), Denial> {
    if resolved.status.is_approved() {
        Ok(())
    } else {
        Err(Denial::Forbidden)
    }
}

/// The full decision for callers that already hold a resolved status.
///
/// `resolved` is only consulted when the approval gate applies; pass `None`
/// to fall back to the session hint.
pub fn decide(
    required: &[Role],
    session: Option<&Session>,
    resolved: Option<ResolvedStatus>,
) -> Result<(), Denial> {
    let session = check_role(required, session)?;
    if needs_approval_check(required, session) {
        let resolved = resolved.unwrap_or_else(|| ResolvedStatus::from_session(session));
        check_approval(resolved)?;
    }
    Ok(())
}
