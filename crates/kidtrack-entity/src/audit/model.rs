//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use kidtrack_core::types::id::{AuditLogId, UserId};

/// An immutable audit log entry recording a mutating operation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: AuditLogId,
    /// The user who performed the action.
    pub actor_id: UserId,
    /// The action that was performed (e.g. `"share.configured"`).
    pub action: String,
    /// The type of target entity (`"share"`, `"invitation"`).
    pub target_type: String,
    /// The target entity ID.
    pub target_id: Option<Uuid>,
    /// Serialized domain event (JSON).
    pub details: Option<serde_json::Value>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}
