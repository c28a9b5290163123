//! Request DTOs.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use kidtrack_core::types::id::{ChildId, UserId};
use kidtrack_entity::share::{ChildPermissions, PermissionLevel, ProfileSpec};
use kidtrack_service::sharing::ShareConfigurationCommand;

/// Body of `POST /api/shares` — the full desired configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureShareRequest {
    /// The viewer to share with.
    pub shared_with_user_id: Uuid,
    /// Visibility tier.
    pub permission_level: PermissionLevel,
    /// Expiry (optional; never expires when omitted).
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Per-child visibility flags. Replaces any existing profile set.
    #[serde(default)]
    pub children: Vec<ShareChildRequest>,
}

/// One child entry in a share configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareChildRequest {
    /// The child to share.
    pub child_id: Uuid,
    /// Viewer may see `interested` activities.
    #[serde(default = "default_true")]
    pub can_view_interested: bool,
    /// Viewer may see `registered` activities.
    #[serde(default = "default_true")]
    pub can_view_registered: bool,
    /// Viewer may see `completed` activities.
    #[serde(default)]
    pub can_view_completed: bool,
    /// Viewer may see parent notes.
    #[serde(default)]
    pub can_view_notes: bool,
}

impl ConfigureShareRequest {
    /// Convert into the service-layer command.
    pub fn into_command(self) -> ShareConfigurationCommand {
        ShareConfigurationCommand {
            shared_with_user_id: UserId::from_uuid(self.shared_with_user_id),
            permission_level: self.permission_level,
            expires_at: self.expires_at,
            profiles: self.children.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ShareChildRequest> for ProfileSpec {
    fn from(req: ShareChildRequest) -> Self {
        Self {
            child_id: ChildId::from_uuid(req.child_id),
            permissions: ChildPermissions {
                can_view_interested: req.can_view_interested,
                can_view_registered: req.can_view_registered,
                can_view_completed: req.can_view_completed,
                can_view_notes: req.can_view_notes,
            },
        }
    }
}

/// Body of `PUT /api/shares/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateShareBody {
    /// New visibility tier.
    pub permission_level: Option<PermissionLevel>,
    /// New expiry.
    #[serde(default)]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Body of `POST /api/invitations`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvitationBody {
    /// Recipient email address.
    #[validate(email)]
    pub recipient_email: String,
    /// Optional personal message.
    pub message: Option<String>,
    /// Lifetime override in days.
    #[validate(range(min = 1, max = 30))]
    pub expires_in_days: Option<u32>,
}

/// Body of `POST /api/invitations/accept` and `.../decline`.
#[derive(Debug, Clone, Deserialize)]
pub struct InvitationTokenBody {
    /// The invitation token delivered out of band.
    pub token: String,
}

/// Query parameters of `GET /api/shared-children`.
#[derive(Debug, Clone, Deserialize)]
pub struct SharedChildrenQuery {
    /// Narrow the view to one sharing user.
    pub sharing_user_id: Option<Uuid>,
}

/// Query parameters of `GET /api/calendar`.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarQuery {
    /// Inclusive window start.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive window end.
    pub to: Option<DateTime<Utc>>,
}

/// Query parameters of `GET /api/admin/audit`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    /// Filter by actor.
    pub actor_id: Option<Uuid>,
    /// Filter by action name.
    pub action: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_child_request_defaults_match_profile_defaults() {
        let req: ShareChildRequest =
            serde_json::from_value(serde_json::json!({ "child_id": Uuid::new_v4() })).unwrap();
        let spec = ProfileSpec::from(req);
        assert_eq!(spec.permissions, ChildPermissions::default());
    }

    #[test]
    fn test_invitation_body_rejects_bad_email() {
        let body = CreateInvitationBody {
            recipient_email: "not-an-email".to_string(),
            message: None,
            expires_in_days: None,
        };
        assert!(body.validate().is_err());
    }
}
