//! Outbound notification port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// The kinds of notification the sharing core emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A viewer was granted (or re-granted) visibility into children.
    ShareConfigured,
    /// A viewer's access was revoked.
    ShareRevoked,
    /// An invitation was sent to a recipient email.
    InvitationSent,
    /// A sender's invitation was accepted.
    InvitationAccepted,
    /// A sender's invitation was declined.
    InvitationDeclined,
}

impl NotificationKind {
    /// Template identifier used by the delivery collaborator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShareConfigured => "share_configured",
            Self::ShareRevoked => "share_revoked",
            Self::InvitationSent => "invitation_sent",
            Self::InvitationAccepted => "invitation_accepted",
            Self::InvitationDeclined => "invitation_declined",
        }
    }
}

/// A single outbound notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Which template to render.
    pub kind: NotificationKind,
    /// Destination email address.
    pub recipient_email: String,
    /// Template data for the delivery collaborator.
    pub data: serde_json::Value,
}

/// Fire-and-forget delivery port.
///
/// Sends are best-effort: callers log failures and never let them roll back
/// the state change that triggered the notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn send(&self, message: NotificationMessage) -> AppResult<()>;
}
