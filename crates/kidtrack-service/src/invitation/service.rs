//! Invitation service — the handshake that provisions share relationships.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kidtrack_core::config::sharing::SharingConfig;
use kidtrack_core::error::AppError;
use kidtrack_core::events::{DomainEvent, InvitationEvent};
use kidtrack_core::result::AppResult;
use kidtrack_core::traits::AuditSink;
use kidtrack_core::types::id::{InvitationId, UserId};
use kidtrack_database::store::{InvitationStore, ShareStore, UserStore};
use kidtrack_entity::invitation::{CreateInvitation, Invitation, InvitationStatus};
use kidtrack_entity::share::{PermissionLevel, ShareRelationship};

use super::token;
use crate::context::RequestContext;
use crate::notification::NotificationService;

/// Tier assigned to a relationship created by acceptance. Acceptance alone
/// grants no data access: the relationship starts with no profiles, and the
/// sender configures per-child visibility separately.
const DEFAULT_ACCEPT_LEVEL: PermissionLevel = PermissionLevel::ViewRegistered;

/// Orchestrates the invitation state machine.
#[derive(Clone)]
pub struct InvitationService {
    /// Invitation store.
    invitations: Arc<dyn InvitationStore>,
    /// Share store, for the existing-share guard.
    shares: Arc<dyn ShareStore>,
    /// User lookups.
    users: Arc<dyn UserStore>,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
    /// Notification dispatch.
    notifications: Arc<NotificationService>,
    /// Policy knobs (expiry default, pending cap).
    config: SharingConfig,
}

/// Request to create an invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitationRequest {
    /// Recipient email; normalized before use.
    pub recipient_email: String,
    /// Optional personal message.
    pub message: Option<String>,
    /// Lifetime override in days; defaults from configuration.
    pub expires_in_days: Option<u32>,
}

/// Result of a successful acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationAcceptance {
    /// The accepted invitation.
    pub invitation: Invitation,
    /// The share relationship created or reactivated by acceptance.
    pub relationship: ShareRelationship,
}

impl InvitationService {
    /// Creates a new invitation service.
    pub fn new(
        invitations: Arc<dyn InvitationStore>,
        shares: Arc<dyn ShareStore>,
        users: Arc<dyn UserStore>,
        audit: Arc<dyn AuditSink>,
        notifications: Arc<NotificationService>,
        config: SharingConfig,
    ) -> Self {
        Self {
            invitations,
            shares,
            users,
            audit,
            notifications,
            config,
        }
    }

    /// Creates and dispatches a new invitation.
    pub async fn create_invitation(
        &self,
        ctx: &RequestContext,
        request: CreateInvitationRequest,
    ) -> AppResult<Invitation> {
        let recipient_email = normalize_email(&request.recipient_email);
        if recipient_email.is_empty() || !recipient_email.contains('@') {
            return Err(AppError::validation("Invalid recipient email"));
        }
        if recipient_email.eq_ignore_ascii_case(ctx.email.trim()) {
            return Err(AppError::conflict("Cannot invite yourself"));
        }

        let now = Utc::now();

        // If the email already resolves to an account we are actively
        // sharing with, there is nothing for an invitation to establish.
        let recipient = self.users.find_by_email(&recipient_email).await?;
        if let Some(ref recipient) = recipient {
            if let Some(share) = self.shares.find_by_pair(ctx.user_id, recipient.id).await? {
                if share.is_valid_at(now) {
                    return Err(AppError::conflict(
                        "An active share with this user already exists",
                    ));
                }
            }
        }

        if let Some(existing) = self
            .invitations
            .find_pending(ctx.user_id, &recipient_email)
            .await?
        {
            if existing.is_expired_at(now) {
                // Persist the lapse so the stale row cannot block re-inviting.
                self.invitations.mark_expired(existing.id).await?;
            } else {
                return Err(AppError::conflict(
                    "A pending invitation to this email already exists",
                ));
            }
        }

        let pending = self.invitations.count_pending(ctx.user_id, now).await?;
        if pending >= u64::from(self.config.pending_invitation_cap) {
            return Err(AppError::limit_exceeded(format!(
                "Pending invitation limit of {} reached",
                self.config.pending_invitation_cap
            )));
        }

        let expires_in_days = request
            .expires_in_days
            .unwrap_or(self.config.invitation_expiry_days);
        let invitation = self
            .invitations
            .create(&CreateInvitation {
                sender_id: ctx.user_id,
                recipient_email: recipient_email.clone(),
                recipient_user_id: recipient.map(|u| u.id),
                token: token::generate(),
                message: request.message,
                expires_at: now + Duration::days(i64::from(expires_in_days)),
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            invitation_id = %invitation.id,
            "Invitation created"
        );

        self.record(
            ctx.user_id,
            InvitationEvent::Created {
                invitation_id: invitation.id,
                recipient_email: recipient_email.clone(),
            },
        )
        .await;

        let sender_name = self.display_name(ctx).await;
        self.notifications
            .invitation_sent(
                &recipient_email,
                &sender_name,
                &invitation.token,
                invitation.message.as_deref(),
                invitation.expires_at,
            )
            .await;

        Ok(invitation)
    }

    /// Accepts an invitation by token, atomically provisioning the share
    /// relationship.
    pub async fn accept_invitation(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> AppResult<InvitationAcceptance> {
        let now = Utc::now();
        let invitation = self
            .invitations
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Invitation not found"))?;

        self.guard_live(&invitation, now).await?;

        if !invitation.is_addressed_to(&ctx.email) {
            return Err(AppError::authorization(
                "This invitation was sent to a different email address",
            ));
        }

        let (invitation, relationship) = self
            .invitations
            .accept(invitation.id, ctx.user_id, DEFAULT_ACCEPT_LEVEL, now)
            .await?
            .ok_or_else(|| AppError::conflict("Invitation is no longer pending"))?;

        info!(
            user_id = %ctx.user_id,
            invitation_id = %invitation.id,
            share_id = %relationship.id,
            "Invitation accepted"
        );

        self.record(
            ctx.user_id,
            InvitationEvent::Accepted {
                invitation_id: invitation.id,
                share_id: relationship.id,
            },
        )
        .await;

        if let Ok(Some(sender)) = self.users.find_by_id(invitation.sender_id).await {
            self.notifications
                .invitation_accepted(&sender.email, &ctx.email)
                .await;
        }

        Ok(InvitationAcceptance {
            invitation,
            relationship,
        })
    }

    /// Declines an invitation by token. Only the addressed recipient may
    /// decline.
    pub async fn decline_invitation(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> AppResult<Invitation> {
        let now = Utc::now();
        let invitation = self
            .invitations
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Invitation not found"))?;

        self.guard_live(&invitation, now).await?;

        if !invitation.is_addressed_to(&ctx.email) {
            return Err(AppError::authorization(
                "This invitation was sent to a different email address",
            ));
        }

        let invitation = self
            .invitations
            .set_terminal_status(invitation.id, InvitationStatus::Declined)
            .await?
            .ok_or_else(|| AppError::conflict("Invitation is no longer pending"))?;

        info!(
            user_id = %ctx.user_id,
            invitation_id = %invitation.id,
            "Invitation declined"
        );

        self.record(
            ctx.user_id,
            InvitationEvent::Declined {
                invitation_id: invitation.id,
            },
        )
        .await;

        if let Ok(Some(sender)) = self.users.find_by_id(invitation.sender_id).await {
            self.notifications
                .invitation_declined(&sender.email, &ctx.email)
                .await;
        }

        Ok(invitation)
    }

    /// Cancels a pending invitation. Only the sender may cancel.
    pub async fn cancel_invitation(
        &self,
        ctx: &RequestContext,
        invitation_id: InvitationId,
    ) -> AppResult<Invitation> {
        let now = Utc::now();
        let invitation = self
            .invitations
            .find_by_id(invitation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invitation not found"))?;

        if invitation.sender_id != ctx.user_id {
            return Err(AppError::authorization(
                "Only the sender may cancel an invitation",
            ));
        }

        self.guard_live(&invitation, now).await?;

        let invitation = self
            .invitations
            .set_terminal_status(invitation.id, InvitationStatus::Cancelled)
            .await?
            .ok_or_else(|| AppError::conflict("Invitation is no longer pending"))?;

        info!(
            user_id = %ctx.user_id,
            invitation_id = %invitation.id,
            "Invitation cancelled"
        );

        self.record(
            ctx.user_id,
            InvitationEvent::Cancelled {
                invitation_id: invitation.id,
            },
        )
        .await;

        Ok(invitation)
    }

    /// Lists invitations the caller has sent, newest first.
    pub async fn list_sent(&self, ctx: &RequestContext) -> AppResult<Vec<Invitation>> {
        self.invitations.find_by_sender(ctx.user_id).await
    }

    /// Lists invitations addressed to the caller's email, newest first.
    pub async fn list_received(&self, ctx: &RequestContext) -> AppResult<Vec<Invitation>> {
        self.invitations.find_by_recipient_email(&ctx.email).await
    }

    /// Expires every overdue pending invitation. Idempotent; returns the
    /// number affected.
    pub async fn cleanup_expired_invitations(&self) -> AppResult<u64> {
        let count = self.invitations.expire_overdue(Utc::now()).await?;
        info!(count, "Overdue invitations expired");
        Ok(count)
    }

    /// Rejects terminal invitations and persists live-evaluated expiry.
    ///
    /// A pending invitation past its expiry is flipped to `expired` before
    /// the call fails, so stored state stays consistent even when the sweep
    /// has not run yet.
    async fn guard_live(&self, invitation: &Invitation, now: DateTime<Utc>) -> AppResult<()> {
        if invitation.is_pending() && invitation.is_expired_at(now) {
            self.invitations.mark_expired(invitation.id).await?;
            return Err(AppError::expired("Invitation has expired"));
        }
        if invitation.status.is_terminal() {
            return Err(AppError::conflict("Invitation is no longer pending"));
        }
        Ok(())
    }

    /// The caller's display name for notification payloads.
    async fn display_name(&self, ctx: &RequestContext) -> String {
        match self.users.find_by_id(ctx.user_id).await {
            Ok(Some(user)) => user.name,
            _ => ctx.email.clone(),
        }
    }

    /// Record an audit event, logging (not propagating) sink failures.
    async fn record(&self, actor_id: UserId, event: impl Into<DomainEvent>) {
        let event = event.into();
        if let Err(e) = self.audit.record(actor_id, &event).await {
            warn!(action = event.action(), error = %e, "Failed to record audit event");
        }
    }
}

impl std::fmt::Debug for InvitationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvitationService").finish()
    }
}

/// Lowercase and trim an email address.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod unit {
    use super::normalize_email;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Grandma@Example.COM "), "grandma@example.com");
    }
}
