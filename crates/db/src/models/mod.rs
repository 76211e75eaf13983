//! Row models and DTOs, one module per table group.

pub mod conversation;
pub mod listing;
pub mod notification;
pub mod order;
pub mod user;
