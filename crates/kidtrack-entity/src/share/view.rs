//! Projection types returned by the sharing read paths.

use serde::{Deserialize, Serialize};

use kidtrack_core::types::id::{ShareId, UserId};

use crate::activity::ScheduledActivity;
use crate::child::Child;

use super::model::ShareRelationship;
use super::profile::{ActivityShareProfile, ChildPermissions};

/// A share relationship together with its current profile set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareWithProfiles {
    /// The relationship.
    pub relationship: ShareRelationship,
    /// Its per-child profiles.
    pub profiles: Vec<ActivityShareProfile>,
}

/// One shared child as seen by a viewer: the child, the permissions that
/// were applied, and the already-filtered activity list. The unfiltered
/// list never leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedChildView {
    /// The relationship this view came through.
    pub share_id: ShareId,
    /// The sharing user who granted access.
    pub shared_by: UserId,
    /// The shared child.
    pub child: Child,
    /// The permission flags that were applied to produce `activities`.
    pub permissions: ChildPermissions,
    /// Filtered (and notes-redacted) schedule.
    pub activities: Vec<ScheduledActivity>,
}
