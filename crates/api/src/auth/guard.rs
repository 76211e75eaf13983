//! The authorization gate.
//!
//! [`AuthorizationGuard::authorize`] combines the pure decision rules from
//! [`amari_core::access`] with an [`ApprovalStatusResolver`] that fetches the
//! caller's current seller status. The resolver only runs for sellers on
//! seller-exclusive routes.

use std::sync::Arc;

use amari_core::access::{self, Denial, ResolvedStatus, Session, StatusSource};
use amari_core::roles::{Role, SellerStatus};
use amari_db::repositories::UserStore;
use async_trait::async_trait;

/// Looks up the seller status that the approval gate should trust.
#[async_trait]
pub trait ApprovalStatusResolver: Send + Sync {
    async fn resolve(&self, session: &Session) -> ResolvedStatus;
}

/// Reads the status from the user store, degrading to the session hint when
/// the store cannot be read.
pub struct StoreApprovalResolver {
    users: Arc<dyn UserStore>,
}

impl StoreApprovalResolver {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl ApprovalStatusResolver for StoreApprovalResolver {
    async fn resolve(&self, session: &Session) -> ResolvedStatus {
        match self.users.seller_status(session.user_id).await {
            Ok(status) => ResolvedStatus::from_store(status.unwrap_or(SellerStatus::None)),
            Err(e) => {
                tracing::warn!(
                    user_id = session.user_id,
                    error = %e,
                    "Seller status lookup failed, using session hint"
                );
                ResolvedStatus::from_session(session)
            }
        }
    }
}

/// Decides whether a session may call a route requiring `required` roles.
#[derive(Clone)]
pub struct AuthorizationGuard {
    resolver: Arc<dyn ApprovalStatusResolver>,
}

impl AuthorizationGuard {
    pub fn new(resolver: Arc<dyn ApprovalStatusResolver>) -> Self {
        Self { resolver }
    }

    /// Guard backed by the user store.
    pub fn from_users(users: Arc<dyn UserStore>) -> Self {
        Self::new(Arc::new(StoreApprovalResolver::new(users)))
    }

    /// Authorize `session` against `required`, returning the session on
    /// success.
    pub async fn authorize(
        &self,
        required: &[Role],
        session: Option<&Session>,
    ) -> Result<Session, Denial> {
        let resolved = match session {
            Some(s) if access::needs_approval_check(required, s) => {
                let resolved = self.resolver.resolve(s).await;
                if resolved.source == StatusSource::SessionHint {
                    tracing::debug!(user_id = s.user_id, "Approval decided from session hint");
                }
                Some(resolved)
            }
            _ => None,
        };
        access::decide(required, session, resolved)?;
        session.cloned().ok_or(Denial::Unauthenticated)
    }
}
