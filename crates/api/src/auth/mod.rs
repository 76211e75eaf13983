//! Authentication and authorization primitives.
//!
//! - [`jwt`] -- session-claim tokens: generation and validation.
//! - [`guard`] -- the role and seller-approval gate every route goes through.

pub mod guard;
pub mod jwt;
