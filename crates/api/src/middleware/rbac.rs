//! Role-based access control extractors.
//!
//! Each extractor runs the [`AuthorizationGuard`](crate::auth::guard::AuthorizationGuard)
//! with a fixed role set and hands the handler the authorized [`Session`].
//! Use these in handler signatures to enforce authorization at the type
//! level.

use amari_core::access::Session;
use amari_core::error::CoreError;
use amari_core::roles::Role;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::MaybeSession;
use crate::error::AppError;
use crate::state::AppState;

async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    required: &[Role],
) -> Result<Session, AppError> {
    let MaybeSession(session) = match MaybeSession::from_request_parts(parts, state).await {
        Ok(session) => session,
        Err(never) => match never {},
    };
    state
        .guard
        .authorize(required, session.as_ref())
        .await
        .map_err(|denial| AppError::Core(CoreError::from(denial)))
}

/// Requires any authenticated user. Seller approval is not checked.
///
/// ```ignore
/// async fn any_authed(RequireAuth(session): RequireAuth) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAuth(pub Session);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Role::ALL).await.map(RequireAuth)
    }
}

/// Requires the `seller` role and an approved seller status.
pub struct RequireSeller(pub Session);

impl FromRequestParts<AppState> for RequireSeller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, &[Role::Seller]).await.map(RequireSeller)
    }
}

/// Requires an approved seller, or an admin.
pub struct RequireSellerOrAdmin(pub Session);

impl FromRequestParts<AppState> for RequireSellerOrAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, &[Role::Seller, Role::Admin])
            .await
            .map(RequireSellerOrAdmin)
    }
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub Session);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, &[Role::Admin]).await.map(RequireAdmin)
    }
}
