//! Authentication and authorization extractors.
//!
//! - [`auth::MaybeSession`] -- the session from a Bearer token, if any.
//! - [`rbac::RequireAuth`] -- any authenticated role.
//! - [`rbac::RequireSeller`] -- `seller`, approval required.
//! - [`rbac::RequireSellerOrAdmin`] -- `seller` (approval required) or `admin`.
//! - [`rbac::RequireAdmin`] -- `admin` only.

pub mod auth;
pub mod rbac;
