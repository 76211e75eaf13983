//! Session extraction from the `Authorization` header.

use std::convert::Infallible;

use amari_core::access::Session;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::jwt::validate_token;
use crate::state::AppState;

/// The caller's session, or `None` when the request carries no valid
/// Bearer token.
///
/// A missing header, a malformed header, and a token that fails validation
/// are all treated the same: no session. The authorization guard turns that
/// into `UNAUTHENTICATED` when the route needs one.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
        else {
            return Ok(MaybeSession(None));
        };

        match validate_token(token.trim(), &state.config.jwt) {
            Ok(claims) => Ok(MaybeSession(Some(claims.session()))),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                Ok(MaybeSession(None))
            }
        }
    }
}
