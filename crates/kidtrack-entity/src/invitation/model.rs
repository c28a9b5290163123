//! Invitation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kidtrack_core::types::id::{InvitationId, UserId};

use super::status::InvitationStatus;

/// A time-boxed, token-keyed offer to establish a share relationship.
///
/// The recipient is addressed by email, independently of whether an account
/// exists yet; `recipient_user_id` is resolved at acceptance time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invitation {
    /// Unique invitation identifier.
    pub id: InvitationId,
    /// The user extending the offer.
    pub sender_id: UserId,
    /// Normalized (lowercase, trimmed) recipient email.
    pub recipient_email: String,
    /// Resolved recipient account, once known.
    pub recipient_user_id: Option<UserId>,
    /// Unguessable token delivered out of band.
    #[serde(skip_serializing)]
    pub token: String,
    /// Personal message from the sender.
    pub message: Option<String>,
    /// Current lifecycle status.
    pub status: InvitationStatus,
    /// When the offer lapses.
    pub expires_at: DateTime<Utc>,
    /// When the offer was accepted, if it was.
    pub accepted_at: Option<DateTime<Utc>>,
    /// When the invitation was created.
    pub created_at: DateTime<Utc>,
    /// When the invitation was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    /// Whether the invitation has lapsed at `now`.
    ///
    /// Expiry is evaluated live at every decision point, not only by the
    /// batch sweep, so a just-expired invitation can never be accepted.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the invitation is still awaiting a response.
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Whether `email` matches the invited recipient, case-insensitively.
    pub fn is_addressed_to(&self, email: &str) -> bool {
        self.recipient_email
            .eq_ignore_ascii_case(email.trim())
    }
}

/// Data required to persist a new invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitation {
    /// The sending user.
    pub sender_id: UserId,
    /// Normalized recipient email.
    pub recipient_email: String,
    /// Resolved recipient account, if the email already matches one.
    pub recipient_user_id: Option<UserId>,
    /// Unguessable token.
    pub token: String,
    /// Personal message.
    pub message: Option<String>,
    /// When the offer lapses.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation(expires_at: DateTime<Utc>) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: InvitationId::new(),
            sender_id: UserId::new(),
            recipient_email: "grandma@example.com".to_string(),
            recipient_user_id: None,
            token: "tok".to_string(),
            message: None,
            status: InvitationStatus::Pending,
            expires_at,
            accepted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_expiry_is_inclusive_of_the_boundary() {
        let now = Utc::now();
        let inv = invitation(now);
        assert!(inv.is_expired_at(now));
        assert!(!inv.is_expired_at(now - Duration::seconds(1)));
    }

    #[test]
    fn test_addressing_is_case_insensitive() {
        let inv = invitation(Utc::now() + Duration::days(7));
        assert!(inv.is_addressed_to("Grandma@Example.Com"));
        assert!(!inv.is_addressed_to("grandpa@example.com"));
    }
}
