//! Per-child permission profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kidtrack_core::types::id::{ChildId, ShareId, ShareProfileId};

/// The four independent visibility flags of a permission profile.
///
/// Defaults are conservative: interested and registered activities are
/// visible, completed history and notes are hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildPermissions {
    /// Viewer may see `interested` activities.
    pub can_view_interested: bool,
    /// Viewer may see `registered` activities.
    pub can_view_registered: bool,
    /// Viewer may see `completed` activities.
    pub can_view_completed: bool,
    /// Viewer may see parent notes on visible activities.
    pub can_view_notes: bool,
}

impl Default for ChildPermissions {
    fn default() -> Self {
        Self {
            can_view_interested: true,
            can_view_registered: true,
            can_view_completed: false,
            can_view_notes: false,
        }
    }
}

/// One child's visibility policy within one share relationship.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityShareProfile {
    /// Unique profile identifier.
    pub id: ShareProfileId,
    /// The owning share relationship. Profiles cascade with it.
    pub share_id: ShareId,
    /// The child made visible.
    pub child_id: ChildId,
    /// Viewer may see `interested` activities.
    pub can_view_interested: bool,
    /// Viewer may see `registered` activities.
    pub can_view_registered: bool,
    /// Viewer may see `completed` activities.
    pub can_view_completed: bool,
    /// Viewer may see parent notes.
    pub can_view_notes: bool,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ActivityShareProfile {
    /// The profile's flags as a value object.
    pub fn permissions(&self) -> ChildPermissions {
        ChildPermissions {
            can_view_interested: self.can_view_interested,
            can_view_registered: self.can_view_registered,
            can_view_completed: self.can_view_completed,
            can_view_notes: self.can_view_notes,
        }
    }
}

/// Data required to create one permission profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSpec {
    /// The child to share.
    pub child_id: ChildId,
    /// Visibility flags for that child.
    #[serde(flatten)]
    pub permissions: ChildPermissions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_hide_completed_and_notes() {
        let perms = ChildPermissions::default();
        assert!(perms.can_view_interested);
        assert!(perms.can_view_registered);
        assert!(!perms.can_view_completed);
        assert!(!perms.can_view_notes);
    }
}
