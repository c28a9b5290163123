//! Share and invitation expiry sweep handlers.

use std::sync::Arc;

use tracing;

use kidtrack_service::invitation::InvitationService;
use kidtrack_service::sharing::SharingService;

/// Runs the idempotent expiry sweeps. Safe to trigger repeatedly.
#[derive(Debug, Clone)]
pub struct ExpirySweep {
    /// Sharing service, for the share sweep.
    sharing: Arc<SharingService>,
    /// Invitation service, for the invitation sweep.
    invitations: Arc<InvitationService>,
}

impl ExpirySweep {
    /// Create a new sweep handler.
    pub fn new(sharing: Arc<SharingService>, invitations: Arc<InvitationService>) -> Self {
        Self {
            sharing,
            invitations,
        }
    }

    /// Deactivate expired share relationships.
    pub async fn sweep_shares(&self) {
        tracing::info!("Running expired-share sweep");
        match self.sharing.cleanup_expired_shares().await {
            Ok(count) => tracing::info!(count, "Expired-share sweep finished"),
            Err(e) => tracing::error!(error = %e, "Expired-share sweep failed"),
        }
    }

    /// Expire overdue pending invitations.
    pub async fn sweep_invitations(&self) {
        tracing::info!("Running expired-invitation sweep");
        match self.invitations.cleanup_expired_invitations().await {
            Ok(count) => tracing::info!(count, "Expired-invitation sweep finished"),
            Err(e) => tracing::error!(error = %e, "Expired-invitation sweep failed"),
        }
    }
}
