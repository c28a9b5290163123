//! Invitation status state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an invitation.
///
/// `pending → {accepted, declined, expired, cancelled}`; the four
/// right-hand states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Awaiting a response.
    Pending,
    /// Accepted by the recipient; a share relationship was provisioned.
    Accepted,
    /// Declined by the recipient.
    Declined,
    /// Lapsed past its expiry.
    Expired,
    /// Withdrawn by the sender.
    Cancelled,
}

impl InvitationStatus {
    /// Whether no further transition may leave this status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_is_non_terminal() {
        assert!(!InvitationStatus::Pending.is_terminal());
        for status in [
            InvitationStatus::Accepted,
            InvitationStatus::Declined,
            InvitationStatus::Expired,
            InvitationStatus::Cancelled,
        ] {
            assert!(status.is_terminal(), "{status:?} should be terminal");
        }
    }
}
