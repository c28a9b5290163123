//! Invitation-workflow domain events.

use serde::{Deserialize, Serialize};

use crate::types::id::{InvitationId, ShareId};

/// Events related to the invitation handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InvitationEvent {
    /// An invitation was created and dispatched.
    Created {
        /// The invitation ID.
        invitation_id: InvitationId,
        /// Normalized recipient email.
        recipient_email: String,
    },
    /// An invitation was accepted, provisioning a share relationship.
    Accepted {
        /// The invitation ID.
        invitation_id: InvitationId,
        /// The share relationship created or reactivated by acceptance.
        share_id: ShareId,
    },
    /// An invitation was declined by its recipient.
    Declined {
        /// The invitation ID.
        invitation_id: InvitationId,
    },
    /// An invitation was cancelled by its sender.
    Cancelled {
        /// The invitation ID.
        invitation_id: InvitationId,
    },
}

impl InvitationEvent {
    /// Stable dotted action name.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Created { .. } => "invitation.created",
            Self::Accepted { .. } => "invitation.accepted",
            Self::Declined { .. } => "invitation.declined",
            Self::Cancelled { .. } => "invitation.cancelled",
        }
    }

    /// The invitation this event concerns.
    pub fn invitation_id(&self) -> InvitationId {
        match self {
            Self::Created { invitation_id, .. }
            | Self::Accepted { invitation_id, .. }
            | Self::Declined { invitation_id }
            | Self::Cancelled { invitation_id } => *invitation_id,
        }
    }
}
