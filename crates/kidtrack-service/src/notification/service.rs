//! Notification template assembly and best-effort delivery.
//!
//! Rendering and transport are the notification collaborator's concern;
//! this service builds the template data and hands it to the [`Notifier`]
//! port. Delivery failures are logged and never propagated — a failed
//! notification is not a failure of the state change that triggered it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use kidtrack_core::config::notification::NotificationConfig;
use kidtrack_core::traits::{NotificationKind, NotificationMessage, Notifier};

/// Assembles and dispatches outbound notifications.
#[derive(Clone)]
pub struct NotificationService {
    /// Delivery port.
    notifier: Arc<dyn Notifier>,
    /// Relay configuration.
    config: NotificationConfig,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(notifier: Arc<dyn Notifier>, config: NotificationConfig) -> Self {
        Self { notifier, config }
    }

    /// Tell a viewer which children are now shared with them.
    pub async fn share_configured(
        &self,
        viewer_email: &str,
        sharer_name: &str,
        child_names: &[String],
    ) {
        self.deliver(
            NotificationKind::ShareConfigured,
            viewer_email,
            serde_json::json!({
                "shared_by": sharer_name,
                "children": child_names,
            }),
        )
        .await;
    }

    /// Tell a viewer their access was revoked.
    pub async fn share_revoked(&self, viewer_email: &str, sharer_name: &str) {
        self.deliver(
            NotificationKind::ShareRevoked,
            viewer_email,
            serde_json::json!({ "shared_by": sharer_name }),
        )
        .await;
    }

    /// Deliver an invitation, including its accept link.
    pub async fn invitation_sent(
        &self,
        recipient_email: &str,
        sender_name: &str,
        token: &str,
        message: Option<&str>,
        expires_at: DateTime<Utc>,
    ) {
        self.deliver(
            NotificationKind::InvitationSent,
            recipient_email,
            serde_json::json!({
                "sender": sender_name,
                "message": message,
                "expires_at": expires_at,
                "accept_url": format!(
                    "{}/invitations/accept?token={token}",
                    self.config.app_base_url
                ),
            }),
        )
        .await;
    }

    /// Tell a sender their invitation was accepted.
    pub async fn invitation_accepted(&self, sender_email: &str, recipient_email: &str) {
        self.deliver(
            NotificationKind::InvitationAccepted,
            sender_email,
            serde_json::json!({ "recipient": recipient_email }),
        )
        .await;
    }

    /// Tell a sender their invitation was declined.
    pub async fn invitation_declined(&self, sender_email: &str, recipient_email: &str) {
        self.deliver(
            NotificationKind::InvitationDeclined,
            sender_email,
            serde_json::json!({ "recipient": recipient_email }),
        )
        .await;
    }

    async fn deliver(&self, kind: NotificationKind, recipient: &str, data: serde_json::Value) {
        if !self.config.enabled {
            debug!(kind = kind.as_str(), "Notifications disabled; skipping");
            return;
        }

        let message = NotificationMessage {
            kind,
            recipient_email: recipient.to_string(),
            data,
        };

        if let Err(e) = self.notifier.send(message).await {
            warn!(
                kind = kind.as_str(),
                recipient = recipient,
                error = %e,
                "Notification delivery failed"
            );
        }
    }
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("enabled", &self.config.enabled)
            .finish()
    }
}
