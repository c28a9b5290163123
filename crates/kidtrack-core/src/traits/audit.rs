//! Audit sink port.

use async_trait::async_trait;

use crate::events::DomainEvent;
use crate::result::AppResult;
use crate::types::id::UserId;

/// Structured event sink recording every mutating operation.
///
/// Implementations persist `{actor, action, target, details, timestamp}`;
/// the action, target type, and detail payload are derived from the typed
/// event so call sites cannot drift from the recorded schema.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record a domain event performed by `actor_id`.
    async fn record(&self, actor_id: UserId, event: &DomainEvent) -> AppResult<()>;
}
