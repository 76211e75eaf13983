//! Domain services.
//!
//! Handlers stay thin: they authorize, parse the request into a validated
//! core type, and call one of these services. Services own the multi-step
//! operations (checkout, conversation membership checks) and the
//! notification fan-out that follows a successful write.

pub mod conversations;
pub mod notifications;
pub mod orders;

pub use conversations::ConversationService;
pub use notifications::NotificationService;
pub use orders::OrderService;
