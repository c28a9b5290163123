//! Sharing service — orchestrates share relationships, permission
//! profiles, and the filtered projection of shared children.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kidtrack_core::error::AppError;
use kidtrack_core::events::{DomainEvent, ShareEvent};
use kidtrack_core::result::AppResult;
use kidtrack_core::traits::AuditSink;
use kidtrack_core::types::id::{ChildId, ShareId, UserId};
use kidtrack_database::store::{ActivityStore, ChildStore, ShareStore, UserStore};
use kidtrack_entity::share::{
    ActivityShareProfile, ChildPermissions, PermissionLevel, ProfileSpec, ShareRelationship,
    ShareWithProfiles, SharedChildView,
};

use super::command::ShareConfigurationCommand;
use super::filter;
use crate::context::RequestContext;
use crate::notification::NotificationService;

/// Manages share relationships and computes viewers' filtered projections.
#[derive(Clone)]
pub struct SharingService {
    /// Share relationship + profile store.
    shares: Arc<dyn ShareStore>,
    /// Child lookups.
    children: Arc<dyn ChildStore>,
    /// Scheduled-activity lookups.
    activities: Arc<dyn ActivityStore>,
    /// User lookups.
    users: Arc<dyn UserStore>,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
    /// Notification dispatch.
    notifications: Arc<NotificationService>,
}

/// Request to update an existing share relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateShareRequest {
    /// New visibility tier.
    pub permission_level: Option<PermissionLevel>,
    /// New expiry (`Some(None)` clears it).
    pub expires_at: Option<Option<DateTime<Utc>>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl SharingService {
    /// Creates a new sharing service.
    pub fn new(
        shares: Arc<dyn ShareStore>,
        children: Arc<dyn ChildStore>,
        activities: Arc<dyn ActivityStore>,
        users: Arc<dyn UserStore>,
        audit: Arc<dyn AuditSink>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            shares,
            children,
            activities,
            users,
            audit,
            notifications,
        }
    }

    /// Creates or reconfigures the share relationship with a viewer.
    ///
    /// Validation is all-or-nothing: every referenced child must be an
    /// active child owned by the caller, checked before any write. An
    /// existing relationship for the pair is updated in place and its
    /// profile set fully replaced; the storage layer runs upsert + replace
    /// as one transaction.
    pub async fn configure_sharing(
        &self,
        ctx: &RequestContext,
        command: ShareConfigurationCommand,
    ) -> AppResult<ShareRelationship> {
        if command.shared_with_user_id == ctx.user_id {
            return Err(AppError::conflict("Cannot share children with yourself"));
        }

        let viewer = self
            .users
            .find_by_id(command.shared_with_user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Viewer account not found"))?;

        let mut seen = HashSet::new();
        for spec in &command.profiles {
            if !seen.insert(spec.child_id) {
                return Err(AppError::validation(format!(
                    "Child {} appears more than once",
                    spec.child_id
                )));
            }
        }

        let child_ids: Vec<ChildId> = command.profiles.iter().map(|p| p.child_id).collect();
        let children = self.children.find_by_ids(&child_ids).await?;
        for spec in &command.profiles {
            let child = children
                .iter()
                .find(|c| c.id == spec.child_id)
                .ok_or_else(|| {
                    AppError::validation(format!("Child {} does not exist", spec.child_id))
                })?;
            if !child.is_owned_by(ctx.user_id) {
                return Err(AppError::validation(format!(
                    "Child {} is not owned by the caller",
                    spec.child_id
                )));
            }
            if !child.is_active {
                return Err(AppError::validation(format!(
                    "Child {} is not active",
                    spec.child_id
                )));
            }
        }

        let profile_count = command.profiles.len();
        let config = command.into_configuration(ctx.user_id);
        let share = self.shares.apply_configuration(&config).await?;

        info!(
            user_id = %ctx.user_id,
            share_id = %share.id,
            shared_with = %share.shared_with_user_id,
            profile_count,
            "Share configured"
        );

        self.record(
            ctx.user_id,
            ShareEvent::Configured {
                share_id: share.id,
                shared_with: share.shared_with_user_id,
                profile_count,
            },
        )
        .await;

        let sharer_name = self.display_name(ctx).await;
        let child_names: Vec<String> = children.into_iter().map(|c| c.name).collect();
        self.notifications
            .share_configured(&viewer.email, &sharer_name, &child_names)
            .await;

        Ok(share)
    }

    /// Lists the caller's share relationships with their profile sets.
    pub async fn get_user_shares(&self, ctx: &RequestContext) -> AppResult<Vec<ShareWithProfiles>> {
        let relationships = self.shares.find_by_sharing_user(ctx.user_id).await?;
        let mut result = Vec::with_capacity(relationships.len());
        for relationship in relationships {
            let profiles = self.shares.profiles_for_share(relationship.id).await?;
            result.push(ShareWithProfiles {
                relationship,
                profiles,
            });
        }
        Ok(result)
    }

    /// Computes the caller's filtered view of every child shared with them,
    /// optionally narrowed to one sharing user.
    ///
    /// A relationship with no profiles yields nothing: absence of a profile
    /// always means "share nothing", never an unrestricted view.
    pub async fn get_shared_children(
        &self,
        ctx: &RequestContext,
        sharing_user_id: Option<UserId>,
    ) -> AppResult<Vec<SharedChildView>> {
        let now = Utc::now();
        let relationships = self
            .shares
            .find_active_for_viewer(ctx.user_id, sharing_user_id, now)
            .await?;

        let mut views = Vec::new();
        for relationship in relationships {
            let profiles = self.shares.profiles_for_share(relationship.id).await?;

            let fetched = try_join_all(profiles.iter().map(|profile| {
                let child_id = profile.child_id;
                async move {
                    let child = self.children.find_by_id(child_id).await?;
                    let activities = self.activities.scheduled_for_child(child_id).await?;
                    Ok::<_, AppError>((child, activities))
                }
            }))
            .await?;

            for (profile, (child, activities)) in profiles.iter().zip(fetched) {
                // Children soft-deleted after sharing stay invisible until
                // their owner reactivates them; the profile row survives.
                let Some(child) = child.filter(|c| c.is_active) else {
                    continue;
                };

                let permissions = profile.permissions();
                let filtered = filter::apply(
                    activities,
                    &permissions,
                    relationship.permission_level,
                    now,
                );

                views.push(SharedChildView {
                    share_id: relationship.id,
                    shared_by: relationship.sharing_user_id,
                    child,
                    permissions,
                    activities: filtered,
                });
            }
        }

        Ok(views)
    }

    /// Updates a share relationship's tier, expiry, or active flag. Only
    /// the original sharing user may call this.
    pub async fn update_share(
        &self,
        ctx: &RequestContext,
        share_id: ShareId,
        request: UpdateShareRequest,
    ) -> AppResult<ShareRelationship> {
        let mut share = self.owned_share(ctx, share_id).await?;
        let was_active = share.is_active;

        if let Some(level) = request.permission_level {
            share.permission_level = level;
        }
        if let Some(expires_at) = request.expires_at {
            share.expires_at = expires_at;
        }
        if let Some(is_active) = request.is_active {
            share.is_active = is_active;
        }

        let share = self.shares.update(&share).await?;

        info!(
            user_id = %ctx.user_id,
            share_id = %share_id,
            is_active = share.is_active,
            "Share updated"
        );

        let revoked = was_active && !share.is_active;
        if revoked {
            self.record(
                ctx.user_id,
                ShareEvent::Revoked {
                    share_id: share.id,
                    shared_with: share.shared_with_user_id,
                },
            )
            .await;

            if let Ok(Some(viewer)) = self.users.find_by_id(share.shared_with_user_id).await {
                let sharer_name = self.display_name(ctx).await;
                self.notifications
                    .share_revoked(&viewer.email, &sharer_name)
                    .await;
            }
        } else {
            self.record(ctx.user_id, ShareEvent::Updated { share_id: share.id })
                .await;
        }

        Ok(share)
    }

    /// Adds one child to an existing share relationship.
    pub async fn add_child_to_share(
        &self,
        ctx: &RequestContext,
        share_id: ShareId,
        spec: ProfileSpec,
    ) -> AppResult<ActivityShareProfile> {
        let share = self.owned_share(ctx, share_id).await?;

        let child = self
            .children
            .find_by_id(spec.child_id)
            .await?
            .ok_or_else(|| {
                AppError::validation(format!("Child {} does not exist", spec.child_id))
            })?;
        if !child.is_owned_by(ctx.user_id) || !child.is_active {
            return Err(AppError::validation(format!(
                "Child {} is not an active child of the caller",
                spec.child_id
            )));
        }

        if self
            .shares
            .find_profile(share.id, spec.child_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Child is already part of this share"));
        }

        let profile = self.shares.insert_profile(share.id, &spec).await?;

        info!(
            user_id = %ctx.user_id,
            share_id = %share_id,
            child_id = %spec.child_id,
            "Child added to share"
        );

        self.record(
            ctx.user_id,
            ShareEvent::ChildAdded {
                share_id: share.id,
                child_id: spec.child_id,
            },
        )
        .await;

        Ok(profile)
    }

    /// Replaces one child's permission flags within a share relationship.
    pub async fn update_child_permissions(
        &self,
        ctx: &RequestContext,
        share_id: ShareId,
        child_id: ChildId,
        permissions: ChildPermissions,
    ) -> AppResult<ActivityShareProfile> {
        let share = self.owned_share(ctx, share_id).await?;

        let profile = self
            .shares
            .update_profile(share.id, child_id, &permissions)
            .await?
            .ok_or_else(|| AppError::not_found("Child is not part of this share"))?;

        info!(
            user_id = %ctx.user_id,
            share_id = %share_id,
            child_id = %child_id,
            "Child permissions updated"
        );

        self.record(
            ctx.user_id,
            ShareEvent::PermissionsUpdated {
                share_id: share.id,
                child_id,
            },
        )
        .await;

        Ok(profile)
    }

    /// Removes one child from a share relationship. Removing the last
    /// profile deactivates the relationship — it no longer shares anything
    /// — while preserving the row for the audit trail.
    pub async fn remove_child_from_share(
        &self,
        ctx: &RequestContext,
        share_id: ShareId,
        child_id: ChildId,
    ) -> AppResult<()> {
        let share = self.owned_share(ctx, share_id).await?;

        let deleted = self.shares.delete_profile(share.id, child_id).await?;
        if !deleted {
            return Err(AppError::not_found("Child is not part of this share"));
        }

        let remaining = self.shares.count_profiles(share.id).await?;
        let deactivated = remaining == 0;
        if deactivated {
            self.shares.deactivate(share.id).await?;
            info!(
                share_id = %share_id,
                "Last profile removed; share deactivated"
            );
        }

        info!(
            user_id = %ctx.user_id,
            share_id = %share_id,
            child_id = %child_id,
            remaining,
            "Child removed from share"
        );

        self.record(
            ctx.user_id,
            ShareEvent::ChildRemoved {
                share_id: share.id,
                child_id,
                deactivated,
            },
        )
        .await;

        Ok(())
    }

    /// Deactivates every share relationship whose expiry has passed.
    /// Idempotent; returns the number affected.
    pub async fn cleanup_expired_shares(&self) -> AppResult<u64> {
        let count = self.shares.deactivate_expired(Utc::now()).await?;
        info!(count, "Expired shares deactivated");
        Ok(count)
    }

    /// Fast authorization check used by collaborators before exposing a
    /// child record to a non-owner. Existence check only: status and notes
    /// filters remain the caller's responsibility.
    pub async fn has_access_to_child(
        &self,
        viewer_id: UserId,
        child_id: ChildId,
    ) -> AppResult<bool> {
        let child = self
            .children
            .find_by_id(child_id)
            .await?
            .ok_or_else(|| AppError::not_found("Child not found"))?;

        if child.is_owned_by(viewer_id) {
            return Ok(true);
        }

        self.shares
            .viewer_has_grant(viewer_id, child_id, Utc::now())
            .await
    }

    /// Fetch a share and require the caller to be its sharing user.
    async fn owned_share(
        &self,
        ctx: &RequestContext,
        share_id: ShareId,
    ) -> AppResult<ShareRelationship> {
        let share = self
            .shares
            .find_by_id(share_id)
            .await?
            .ok_or_else(|| AppError::not_found("Share relationship not found"))?;

        if share.sharing_user_id != ctx.user_id {
            return Err(AppError::authorization(
                "Only the sharing user may modify this share",
            ));
        }

        Ok(share)
    }

    /// The caller's display name for notification payloads, falling back
    /// to their email.
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

impl std::fmt::Debug for SharingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharingService").finish()
    }
}
