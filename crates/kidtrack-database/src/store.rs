//! Store traits — the seam between the service layer and persistence.
//!
//! Operations that must be atomic (`apply_configuration`, `accept`) are
//! single trait methods so transactionality is an implementation concern
//! and never leaks partial writes across the seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use kidtrack_core::result::AppResult;
use kidtrack_core::types::id::{ChildId, InvitationId, ShareId, UserId};
use kidtrack_entity::activity::ScheduledActivity;
use kidtrack_entity::child::Child;
use kidtrack_entity::invitation::{CreateInvitation, Invitation};
use kidtrack_entity::share::{
    ActivityShareProfile, ChildPermissions, PermissionLevel, ProfileSpec, ShareConfiguration,
    ShareRelationship,
};
use kidtrack_entity::user::User;

/// Read access to user accounts (owned by the identity collaborator).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by ID.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

/// Read access to child profiles (owned by the child-management collaborator).
#[async_trait]
pub trait ChildStore: Send + Sync {
    /// Find a child by ID.
    async fn find_by_id(&self, id: ChildId) -> AppResult<Option<Child>>;

    /// Find several children at once.
    async fn find_by_ids(&self, ids: &[ChildId]) -> AppResult<Vec<Child>>;

    /// List a user's active children.
    async fn find_active_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Child>>;
}

/// Read access to scheduled activities (owned by the activity collaborator).
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// List a child's complete scheduled-activity list with catalog data.
    async fn scheduled_for_child(&self, child_id: ChildId) -> AppResult<Vec<ScheduledActivity>>;
}

/// Persistence for share relationships and their permission profiles.
#[async_trait]
pub trait ShareStore: Send + Sync {
    /// Find a relationship by ID.
    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<ShareRelationship>>;

    /// Find the relationship for an ordered `(sharing, viewer)` pair.
    async fn find_by_pair(
        &self,
        sharing_user_id: UserId,
        shared_with_user_id: UserId,
    ) -> AppResult<Option<ShareRelationship>>;

    /// List all relationships created by a sharing user.
    async fn find_by_sharing_user(
        &self,
        sharing_user_id: UserId,
    ) -> AppResult<Vec<ShareRelationship>>;

    /// List active, non-expired relationships granting `viewer_id` access,
    /// optionally narrowed to one sharing user.
    async fn find_active_for_viewer(
        &self,
        viewer_id: UserId,
        sharing_user_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ShareRelationship>>;

    /// Atomically upsert the relationship for the configuration's pair,
    /// reactivating it, and replace its entire profile set. Concurrent calls
    /// for the same pair serialize on the pair's unique constraint;
    /// last-committed-wins, never a merge.
    async fn apply_configuration(
        &self,
        config: &ShareConfiguration,
    ) -> AppResult<ShareRelationship>;

    /// Persist tier/expiry/active changes to an existing relationship.
    async fn update(&self, share: &ShareRelationship) -> AppResult<ShareRelationship>;

    /// Deactivate a relationship. Returns `false` if it did not exist.
    async fn deactivate(&self, id: ShareId) -> AppResult<bool>;

    /// Deactivate every active relationship whose expiry has passed.
    /// Returns the number of rows affected. Idempotent.
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// List a relationship's profiles.
    async fn profiles_for_share(&self, share_id: ShareId) -> AppResult<Vec<ActivityShareProfile>>;

    /// Find one `(relationship, child)` profile.
    async fn find_profile(
        &self,
        share_id: ShareId,
        child_id: ChildId,
    ) -> AppResult<Option<ActivityShareProfile>>;

    /// Insert one profile.
    async fn insert_profile(
        &self,
        share_id: ShareId,
        spec: &ProfileSpec,
    ) -> AppResult<ActivityShareProfile>;

    /// Update one profile's flags. Returns `None` if the profile is missing.
    async fn update_profile(
        &self,
        share_id: ShareId,
        child_id: ChildId,
        permissions: &ChildPermissions,
    ) -> AppResult<Option<ActivityShareProfile>>;

    /// Delete one profile. Returns `false` if it did not exist.
    async fn delete_profile(&self, share_id: ShareId, child_id: ChildId) -> AppResult<bool>;

    /// Count a relationship's remaining profiles.
    async fn count_profiles(&self, share_id: ShareId) -> AppResult<u64>;

    /// Whether any active, non-expired relationship grants `viewer_id` a
    /// profile for `child_id`. Existence check only; status/notes filters
    /// are the caller's concern.
    async fn viewer_has_grant(
        &self,
        viewer_id: UserId,
        child_id: ChildId,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;
}

/// Persistence for invitations.
#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Persist a new pending invitation.
    async fn create(&self, data: &CreateInvitation) -> AppResult<Invitation>;

    /// Find an invitation by ID.
    async fn find_by_id(&self, id: InvitationId) -> AppResult<Option<Invitation>>;

    /// Find an invitation by its token.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Invitation>>;

    /// Find a sender's pending invitation to an email, if any. Expiry is
    /// not filtered here: the caller evaluates it live and persists the
    /// transition, so a stale pending row can never block a re-invite.
    async fn find_pending(
        &self,
        sender_id: UserId,
        recipient_email: &str,
    ) -> AppResult<Option<Invitation>>;

    /// Count a sender's pending, non-expired invitations.
    async fn count_pending(&self, sender_id: UserId, now: DateTime<Utc>) -> AppResult<u64>;

    /// List invitations sent by a user, newest first.
    async fn find_by_sender(&self, sender_id: UserId) -> AppResult<Vec<Invitation>>;

    /// List invitations addressed to an email, newest first.
    async fn find_by_recipient_email(&self, email: &str) -> AppResult<Vec<Invitation>>;

    /// Persist an opportunistic pending → expired transition.
    async fn mark_expired(&self, id: InvitationId) -> AppResult<()>;

    /// Move a pending invitation to `declined` or `cancelled`. Returns
    /// `None` if the invitation was no longer pending (lost race).
    async fn set_terminal_status(
        &self,
        id: InvitationId,
        status: kidtrack_entity::invitation::InvitationStatus,
    ) -> AppResult<Option<Invitation>>;

    /// Atomically accept a pending invitation and create-or-reactivate the
    /// corresponding share relationship. A newly created relationship gets
    /// `default_level` and no profiles; a reactivated one keeps its existing
    /// configuration untouched. Returns `None` if the invitation was no
    /// longer pending.
    async fn accept(
        &self,
        id: InvitationId,
        recipient_user_id: UserId,
        default_level: PermissionLevel,
        now: DateTime<Utc>,
    ) -> AppResult<Option<(Invitation, ShareRelationship)>>;

    /// Expire every pending invitation whose expiry has passed. Returns the
    /// number of rows affected. Idempotent.
    async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
