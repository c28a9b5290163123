//! Share-relationship domain events.

use serde::{Deserialize, Serialize};

use crate::types::id::{ChildId, ShareId, UserId};

/// Events related to share relationships and their permission profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShareEvent {
    /// A share relationship was created or reconfigured.
    Configured {
        /// The share relationship ID.
        share_id: ShareId,
        /// The viewer granted access.
        shared_with: UserId,
        /// Number of permission profiles in the new configuration.
        profile_count: usize,
    },
    /// A share relationship's tier, expiry, or active flag changed.
    Updated {
        /// The share relationship ID.
        share_id: ShareId,
    },
    /// A share relationship was deactivated by its sharing user.
    Revoked {
        /// The share relationship ID.
        share_id: ShareId,
        /// The viewer who lost access.
        shared_with: UserId,
    },
    /// A child was added to a share relationship.
    ChildAdded {
        /// The share relationship ID.
        share_id: ShareId,
        /// The child now visible through the relationship.
        child_id: ChildId,
    },
    /// A child was removed from a share relationship.
    ChildRemoved {
        /// The share relationship ID.
        share_id: ShareId,
        /// The child no longer visible.
        child_id: ChildId,
        /// Whether removing this child emptied and deactivated the relationship.
        deactivated: bool,
    },
    /// A child's permission flags were changed.
    PermissionsUpdated {
        /// The share relationship ID.
        share_id: ShareId,
        /// The child whose flags changed.
        child_id: ChildId,
    },
}

impl ShareEvent {
    /// Stable dotted action name.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Configured { .. } => "share.configured",
            Self::Updated { .. } => "share.updated",
            Self::Revoked { .. } => "share.revoked",
            Self::ChildAdded { .. } => "share.child_added",
            Self::ChildRemoved { .. } => "share.child_removed",
            Self::PermissionsUpdated { .. } => "share.permissions_updated",
        }
    }

    /// The share relationship this event concerns.
    pub fn share_id(&self) -> ShareId {
        match self {
            Self::Configured { share_id, .. }
            | Self::Updated { share_id }
            | Self::Revoked { share_id, .. }
            | Self::ChildAdded { share_id, .. }
            | Self::ChildRemoved { share_id, .. }
            | Self::PermissionsUpdated { share_id, .. } => *share_id,
        }
    }
}
