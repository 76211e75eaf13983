//! Domain rules for the Amari magazine marketplace.
//!
//! Everything in this crate is synchronous and storage-agnostic: enums for
//! the closed value sets, the authorization decision, cart and message
//! validation boundaries, pricing and fulfillment derivation.

pub mod access;
pub mod analytics;
pub mod catalog;
pub mod error;
pub mod messaging;
pub mod orders;
pub mod roles;
pub mod types;
