//! The share configuration command.
//!
//! Configuration is destructive by contract: the submitted profile list
//! REPLACES the relationship's entire profile set, it is never merged into
//! it. Making that an explicit command type keeps the semantics visible at
//! every call site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kidtrack_core::types::id::UserId;
use kidtrack_entity::share::{PermissionLevel, ProfileSpec, ShareConfiguration};

/// Full desired state of one share relationship, as submitted by the
/// sharing user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfigurationCommand {
    /// The viewer being granted access.
    pub shared_with_user_id: UserId,
    /// Relationship-wide visibility tier.
    pub permission_level: PermissionLevel,
    /// Expiry (None = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// The complete replacement profile set.
    pub profiles: Vec<ProfileSpec>,
}

impl ShareConfigurationCommand {
    /// Bind the command to the authenticated sharing user, producing the
    /// storage-facing configuration.
    pub fn into_configuration(self, sharing_user_id: UserId) -> ShareConfiguration {
        ShareConfiguration {
            sharing_user_id,
            shared_with_user_id: self.shared_with_user_id,
            permission_level: self.permission_level,
            expires_at: self.expires_at,
            profiles: self.profiles,
        }
    }
}
