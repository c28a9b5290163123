//! In-memory store for service-level tests.
//!
//! One mutex guards the whole state, so every trait method is trivially
//! atomic — the same guarantee the PostgreSQL implementations provide via
//! transactions. Enabled by the `memory` feature; not for production.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use kidtrack_core::error::AppError;
use kidtrack_core::events::DomainEvent;
use kidtrack_core::result::AppResult;
use kidtrack_core::traits::{AuditSink, NotificationMessage, Notifier};
use kidtrack_core::types::id::{ChildId, InvitationId, ShareId, ShareProfileId, UserId};
use kidtrack_entity::activity::ScheduledActivity;
use kidtrack_entity::child::Child;
use kidtrack_entity::invitation::{CreateInvitation, Invitation, InvitationStatus};
use kidtrack_entity::share::{
    ActivityShareProfile, ChildPermissions, PermissionLevel, ProfileSpec, ShareConfiguration,
    ShareRelationship,
};
use kidtrack_entity::user::User;

use crate::store::{ActivityStore, ChildStore, InvitationStore, ShareStore, UserStore};

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    children: Vec<Child>,
    activities: Vec<ScheduledActivity>,
    shares: Vec<ShareRelationship>,
    profiles: Vec<ActivityShareProfile>,
    invitations: Vec<Invitation>,
}

/// In-memory implementation of every store trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user.
    pub fn insert_user(&self, user: User) {
        self.state.write().unwrap().users.push(user);
    }

    /// Seed a child.
    pub fn insert_child(&self, child: Child) {
        self.state.write().unwrap().children.push(child);
    }

    /// Seed a scheduled activity.
    pub fn insert_scheduled_activity(&self, activity: ScheduledActivity) {
        self.state.write().unwrap().activities.push(activity);
    }

    /// Direct read of a stored invitation, for asserting persisted state.
    pub fn invitation(&self, id: InvitationId) -> Option<Invitation> {
        self.state
            .read()
            .unwrap()
            .invitations
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    /// Direct read of a stored relationship, for asserting persisted state.
    pub fn share(&self, id: ShareId) -> Option<ShareRelationship> {
        self.state
            .read()
            .unwrap()
            .shares
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    fn profile_from_spec(share_id: ShareId, spec: &ProfileSpec) -> ActivityShareProfile {
        let now = Utc::now();
        ActivityShareProfile {
            id: ShareProfileId::new(),
            share_id,
            child_id: spec.child_id,
            can_view_interested: spec.permissions.can_view_interested,
            can_view_registered: spec.permissions.can_view_registered,
            can_view_completed: spec.permissions.can_view_completed,
            can_view_notes: spec.permissions.can_view_notes,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl ChildStore for MemoryStore {
    async fn find_by_id(&self, id: ChildId) -> AppResult<Option<Child>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .children
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[ChildId]) -> AppResult<Vec<Child>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .children
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn find_active_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Child>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .children
            .iter()
            .filter(|c| c.owner_id == owner_id && c.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn scheduled_for_child(&self, child_id: ChildId) -> AppResult<Vec<ScheduledActivity>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .activities
            .iter()
            .filter(|a| a.child_id == child_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ShareStore for MemoryStore {
    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<ShareRelationship>> {
        Ok(self.share(id))
    }

    async fn find_by_pair(
        &self,
        sharing_user_id: UserId,
        shared_with_user_id: UserId,
    ) -> AppResult<Option<ShareRelationship>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .shares
            .iter()
            .find(|s| {
                s.sharing_user_id == sharing_user_id
                    && s.shared_with_user_id == shared_with_user_id
            })
            .cloned())
    }

    async fn find_by_sharing_user(
        &self,
        sharing_user_id: UserId,
    ) -> AppResult<Vec<ShareRelationship>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .shares
            .iter()
            .filter(|s| s.sharing_user_id == sharing_user_id)
            .cloned()
            .collect())
    }

    async fn find_active_for_viewer(
        &self,
        viewer_id: UserId,
        sharing_user_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ShareRelationship>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .shares
            .iter()
            .filter(|s| {
                s.shared_with_user_id == viewer_id
                    && s.is_valid_at(now)
                    && sharing_user_id.is_none_or(|id| s.sharing_user_id == id)
            })
            .cloned()
            .collect())
    }

    async fn apply_configuration(
        &self,
        config: &ShareConfiguration,
    ) -> AppResult<ShareRelationship> {
        let mut state = self.state.write().unwrap();
        let now = Utc::now();

        let share = match state.shares.iter_mut().find(|s| {
            s.sharing_user_id == config.sharing_user_id
                && s.shared_with_user_id == config.shared_with_user_id
        }) {
            Some(existing) => {
                existing.permission_level = config.permission_level;
                existing.expires_at = config.expires_at;
                existing.is_active = true;
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let share = ShareRelationship {
                    id: ShareId::new(),
                    sharing_user_id: config.sharing_user_id,
                    shared_with_user_id: config.shared_with_user_id,
                    permission_level: config.permission_level,
                    expires_at: config.expires_at,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                state.shares.push(share.clone());
                share
            }
        };

        state.profiles.retain(|p| p.share_id != share.id);
        for spec in &config.profiles {
            state
                .profiles
                .push(Self::profile_from_spec(share.id, spec));
        }

        Ok(share)
    }

    async fn update(&self, share: &ShareRelationship) -> AppResult<ShareRelationship> {
        let mut state = self.state.write().unwrap();
        let existing = state
            .shares
            .iter_mut()
            .find(|s| s.id == share.id)
            .ok_or_else(|| AppError::not_found("Share relationship not found"))?;
        existing.permission_level = share.permission_level;
        existing.expires_at = share.expires_at;
        existing.is_active = share.is_active;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn deactivate(&self, id: ShareId) -> AppResult<bool> {
        let mut state = self.state.write().unwrap();
        match state.shares.iter_mut().find(|s| s.id == id) {
            Some(share) => {
                share.is_active = false;
                share.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().unwrap();
        let mut count = 0;
        for share in state
            .shares
            .iter_mut()
            .filter(|s| s.is_active && s.is_expired_at(now))
        {
            share.is_active = false;
            share.updated_at = now;
            count += 1;
        }
        Ok(count)
    }

    async fn profiles_for_share(
        &self,
        share_id: ShareId,
    ) -> AppResult<Vec<ActivityShareProfile>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .profiles
            .iter()
            .filter(|p| p.share_id == share_id)
            .cloned()
            .collect())
    }

    async fn find_profile(
        &self,
        share_id: ShareId,
        child_id: ChildId,
    ) -> AppResult<Option<ActivityShareProfile>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .profiles
            .iter()
            .find(|p| p.share_id == share_id && p.child_id == child_id)
            .cloned())
    }

    async fn insert_profile(
        &self,
        share_id: ShareId,
        spec: &ProfileSpec,
    ) -> AppResult<ActivityShareProfile> {
        let profile = Self::profile_from_spec(share_id, spec);
        self.state.write().unwrap().profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_profile(
        &self,
        share_id: ShareId,
        child_id: ChildId,
        permissions: &ChildPermissions,
    ) -> AppResult<Option<ActivityShareProfile>> {
        let mut state = self.state.write().unwrap();
        match state
            .profiles
            .iter_mut()
            .find(|p| p.share_id == share_id && p.child_id == child_id)
        {
            Some(profile) => {
                profile.can_view_interested = permissions.can_view_interested;
                profile.can_view_registered = permissions.can_view_registered;
                profile.can_view_completed = permissions.can_view_completed;
                profile.can_view_notes = permissions.can_view_notes;
                profile.updated_at = Utc::now();
                Ok(Some(profile.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_profile(&self, share_id: ShareId, child_id: ChildId) -> AppResult<bool> {
        let mut state = self.state.write().unwrap();
        let before = state.profiles.len();
        state
            .profiles
            .retain(|p| !(p.share_id == share_id && p.child_id == child_id));
        Ok(state.profiles.len() < before)
    }

    async fn count_profiles(&self, share_id: ShareId) -> AppResult<u64> {
        Ok(self
            .state
            .read()
            .unwrap()
            .profiles
            .iter()
            .filter(|p| p.share_id == share_id)
            .count() as u64)
    }

    async fn viewer_has_grant(
        &self,
        viewer_id: UserId,
        child_id: ChildId,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let state = self.state.read().unwrap();
        Ok(state.profiles.iter().any(|p| {
            p.child_id == child_id
                && state.shares.iter().any(|s| {
                    s.id == p.share_id
                        && s.shared_with_user_id == viewer_id
                        && s.is_valid_at(now)
                })
        }))
    }
}

#[async_trait]
impl InvitationStore for MemoryStore {
    async fn create(&self, data: &CreateInvitation) -> AppResult<Invitation> {
        let now = Utc::now();
        let invitation = Invitation {
            id: InvitationId::new(),
            sender_id: data.sender_id,
            recipient_email: data.recipient_email.clone(),
            recipient_user_id: data.recipient_user_id,
            token: data.token.clone(),
            message: data.message.clone(),
            status: InvitationStatus::Pending,
            expires_at: data.expires_at,
            accepted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .unwrap()
            .invitations
            .push(invitation.clone());
        Ok(invitation)
    }

    async fn find_by_id(&self, id: InvitationId) -> AppResult<Option<Invitation>> {
        Ok(self.invitation(id))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Invitation>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .invitations
            .iter()
            .find(|i| i.token == token)
            .cloned())
    }

    async fn find_pending(
        &self,
        sender_id: UserId,
        recipient_email: &str,
    ) -> AppResult<Option<Invitation>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .invitations
            .iter()
            .find(|i| {
                i.sender_id == sender_id
                    && i.recipient_email == recipient_email
                    && i.is_pending()
            })
            .cloned())
    }

    async fn count_pending(&self, sender_id: UserId, now: DateTime<Utc>) -> AppResult<u64> {
        Ok(self
            .state
            .read()
            .unwrap()
            .invitations
            .iter()
            .filter(|i| i.sender_id == sender_id && i.is_pending() && !i.is_expired_at(now))
            .count() as u64)
    }

    async fn find_by_sender(&self, sender_id: UserId) -> AppResult<Vec<Invitation>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .invitations
            .iter()
            .filter(|i| i.sender_id == sender_id)
            .cloned()
            .collect())
    }

    async fn find_by_recipient_email(&self, email: &str) -> AppResult<Vec<Invitation>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .invitations
            .iter()
            .filter(|i| i.recipient_email.eq_ignore_ascii_case(email))
            .cloned()
            .collect())
    }

    async fn mark_expired(&self, id: InvitationId) -> AppResult<()> {
        let mut state = self.state.write().unwrap();
        if let Some(invitation) = state
            .invitations
            .iter_mut()
            .find(|i| i.id == id && i.is_pending())
        {
            invitation.status = InvitationStatus::Expired;
            invitation.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_terminal_status(
        &self,
        id: InvitationId,
        status: InvitationStatus,
    ) -> AppResult<Option<Invitation>> {
        let mut state = self.state.write().unwrap();
        match state
            .invitations
            .iter_mut()
            .find(|i| i.id == id && i.is_pending())
        {
            Some(invitation) => {
                invitation.status = status;
                invitation.updated_at = Utc::now();
                Ok(Some(invitation.clone()))
            }
            None => Ok(None),
        }
    }

    async fn accept(
        &self,
        id: InvitationId,
        recipient_user_id: UserId,
        default_level: PermissionLevel,
        now: DateTime<Utc>,
    ) -> AppResult<Option<(Invitation, ShareRelationship)>> {
        let mut state = self.state.write().unwrap();

        let invitation = match state
            .invitations
            .iter_mut()
            .find(|i| i.id == id && i.is_pending())
        {
            Some(invitation) => {
                invitation.status = InvitationStatus::Accepted;
                invitation.recipient_user_id = Some(recipient_user_id);
                invitation.accepted_at = Some(now);
                invitation.updated_at = now;
                invitation.clone()
            }
            None => return Ok(None),
        };

        let share = match state.shares.iter_mut().find(|s| {
            s.sharing_user_id == invitation.sender_id
                && s.shared_with_user_id == recipient_user_id
        }) {
            Some(existing) => {
                existing.is_active = true;
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let share = ShareRelationship {
                    id: ShareId::new(),
                    sharing_user_id: invitation.sender_id,
                    shared_with_user_id: recipient_user_id,
                    permission_level: default_level,
                    expires_at: None,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                state.shares.push(share.clone());
                share
            }
        };

        Ok(Some((invitation, share)))
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().unwrap();
        let mut count = 0;
        for invitation in state
            .invitations
            .iter_mut()
            .filter(|i| i.is_pending() && i.is_expired_at(now))
        {
            invitation.status = InvitationStatus::Expired;
            invitation.updated_at = now;
            count += 1;
        }
        Ok(count)
    }
}

/// A recorded audit entry, for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedAudit {
    /// Acting user.
    pub actor_id: UserId,
    /// Dotted action name.
    pub action: String,
    /// Target entity ID.
    pub target_id: Uuid,
}

/// Audit sink that records events in memory.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<RecordedAudit>>,
}

impl RecordingAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries.
    pub fn records(&self) -> Vec<RecordedAudit> {
        self.records.lock().unwrap().clone()
    }

    /// Just the action names, in order.
    pub fn actions(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.action.clone())
            .collect()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, actor_id: UserId, event: &DomainEvent) -> AppResult<()> {
        self.records.lock().unwrap().push(RecordedAudit {
            actor_id,
            action: event.action().to_string(),
            target_id: event.target_id(),
        });
        Ok(())
    }
}

/// Notifier that records messages in memory; can be made to fail to
/// exercise the best-effort delivery contract.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<NotificationMessage>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// Create a notifier that accepts every send.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a notifier whose sends all fail.
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.failing.store(true, Ordering::SeqCst);
        notifier
    }

    /// All messages handed to the notifier.
    pub fn sent(&self) -> Vec<NotificationMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: NotificationMessage) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::external_service("notification relay unavailable"));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}
