//! Sharing and invitation policy configuration.

use serde::{Deserialize, Serialize};

/// Policy knobs for the sharing/invitation core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharingConfig {
    /// Default invitation lifetime in days.
    #[serde(default = "default_invitation_expiry_days")]
    pub invitation_expiry_days: u32,
    /// Maximum simultaneously pending invitations per sender.
    #[serde(default = "default_pending_invitation_cap")]
    pub pending_invitation_cap: u32,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            invitation_expiry_days: default_invitation_expiry_days(),
            pending_invitation_cap: default_pending_invitation_cap(),
        }
    }
}

fn default_invitation_expiry_days() -> u32 {
    7
}

fn default_pending_invitation_cap() -> u32 {
    50
}
