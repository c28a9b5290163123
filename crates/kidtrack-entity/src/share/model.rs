//! Share relationship entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kidtrack_core::types::id::{ShareId, UserId};

use super::profile::ProfileSpec;

/// Relationship-wide coarse visibility tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "permission_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// No tier-level restriction beyond the per-child flags.
    ViewAll,
    /// Historically a registered-only tier; currently no effect beyond the
    /// per-child flags (see the tier filter stage).
    ViewRegistered,
    /// Restrict visibility to activities starting strictly in the future.
    ViewFuture,
}

/// An agreement granting one user visibility into another user's children.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareRelationship {
    /// Unique share identifier.
    pub id: ShareId,
    /// The user whose children are shared.
    pub sharing_user_id: UserId,
    /// The viewer granted access.
    pub shared_with_user_id: UserId,
    /// Relationship-wide visibility tier.
    pub permission_level: PermissionLevel,
    /// When the relationship expires (None = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// Soft-disable flag. Relationships are never hard-deleted.
    pub is_active: bool,
    /// When the relationship was created.
    pub created_at: DateTime<Utc>,
    /// When the relationship was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ShareRelationship {
    /// Whether the relationship has passed its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    /// Whether the relationship grants access at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }
}

/// Storage-facing payload for the atomic configure operation: upsert of the
/// relationship plus full replacement of its profile set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfiguration {
    /// The user sharing their children.
    pub sharing_user_id: UserId,
    /// The viewer being granted access.
    pub shared_with_user_id: UserId,
    /// Visibility tier.
    pub permission_level: PermissionLevel,
    /// Expiry (None = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// The complete replacement profile set.
    pub profiles: Vec<ProfileSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn relationship(expires_at: Option<DateTime<Utc>>, is_active: bool) -> ShareRelationship {
        let now = Utc::now();
        ShareRelationship {
            id: ShareId::new(),
            sharing_user_id: UserId::new(),
            shared_with_user_id: UserId::new(),
            permission_level: PermissionLevel::ViewRegistered,
            expires_at,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_never_expires_when_expiry_is_null() {
        let rel = relationship(None, true);
        assert!(!rel.is_expired_at(Utc::now() + Duration::days(365 * 10)));
        assert!(rel.is_valid_at(Utc::now()));
    }

    #[test]
    fn test_expired_relationship_is_invalid() {
        let now = Utc::now();
        let rel = relationship(Some(now - Duration::hours(1)), true);
        assert!(rel.is_expired_at(now));
        assert!(!rel.is_valid_at(now));
    }

    #[test]
    fn test_inactive_relationship_is_invalid_even_without_expiry() {
        let rel = relationship(None, false);
        assert!(!rel.is_valid_at(Utc::now()));
    }
}
