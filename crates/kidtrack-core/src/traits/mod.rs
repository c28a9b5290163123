//! Ports injected into the service layer.
//!
//! The audit sink and notifier are trait objects so the services stay
//! testable without a database or an outbound transport wired in.

pub mod audit;
pub mod notifier;

pub use audit::AuditSink;
pub use notifier::{NotificationKind, NotificationMessage, Notifier};
