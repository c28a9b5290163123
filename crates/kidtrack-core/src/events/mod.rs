//! Domain events emitted by mutating operations.
//!
//! Every mutating service call produces one of these events and hands it to
//! the audit sink port, so the audit trail is typed at the point of emission
//! rather than assembled ad hoc at each call site.

pub mod invitation;
pub mod share;

use uuid::Uuid;

pub use invitation::InvitationEvent;
pub use share::ShareEvent;

/// Union of all auditable domain events.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum DomainEvent {
    /// A sharing-relationship event.
    Share(ShareEvent),
    /// An invitation-workflow event.
    Invitation(InvitationEvent),
}

impl DomainEvent {
    /// Stable dotted action name recorded in the audit log.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Share(e) => e.action(),
            Self::Invitation(e) => e.action(),
        }
    }

    /// The entity type this event targets.
    pub fn target_type(&self) -> &'static str {
        match self {
            Self::Share(_) => "share",
            Self::Invitation(_) => "invitation",
        }
    }

    /// The primary entity this event targets.
    pub fn target_id(&self) -> Uuid {
        match self {
            Self::Share(e) => e.share_id().into_uuid(),
            Self::Invitation(e) => e.invitation_id().into_uuid(),
        }
    }
}

impl From<ShareEvent> for DomainEvent {
    fn from(event: ShareEvent) -> Self {
        Self::Share(event)
    }
}

impl From<InvitationEvent> for DomainEvent {
    fn from(event: InvitationEvent) -> Self {
        Self::Invitation(event)
    }
}
