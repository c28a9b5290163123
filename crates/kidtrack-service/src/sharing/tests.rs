//! Service-level tests for the sharing engine.

use chrono::{Duration, Utc};

use kidtrack_core::error::ErrorKind;
use kidtrack_entity::activity::ActivityStatus;
use kidtrack_entity::share::{ChildPermissions, PermissionLevel, ProfileSpec};

use super::command::ShareConfigurationCommand;
use super::service::UpdateShareRequest;
use crate::testing::TestHarness;

fn spec(child_id: kidtrack_core::types::id::ChildId, permissions: ChildPermissions) -> ProfileSpec {
    ProfileSpec {
        child_id,
        permissions,
    }
}

fn command_for(
    viewer: kidtrack_core::types::id::UserId,
    profiles: Vec<ProfileSpec>,
) -> ShareConfigurationCommand {
    ShareConfigurationCommand {
        shared_with_user_id: viewer,
        permission_level: PermissionLevel::ViewAll,
        expires_at: None,
        profiles,
    }
}

#[tokio::test]
async fn test_configure_then_list_round_trips_exact_profile_set() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let c1 = h.add_child(alex.id, "Mia");
    let c2 = h.add_child(alex.id, "Theo");
    let ctx = h.ctx(&alex);

    h.sharing
        .configure_sharing(
            &ctx,
            command_for(
                sam.id,
                vec![
                    spec(c1.id, ChildPermissions::default()),
                    spec(c2.id, ChildPermissions::default()),
                ],
            ),
        )
        .await
        .unwrap();

    // Reconfigure with a smaller set: full replace, not union.
    h.sharing
        .configure_sharing(
            &ctx,
            command_for(
                sam.id,
                vec![spec(
                    c2.id,
                    ChildPermissions {
                        can_view_completed: true,
                        ..ChildPermissions::default()
                    },
                )],
            ),
        )
        .await
        .unwrap();

    let shares = h.sharing.get_user_shares(&ctx).await.unwrap();
    assert_eq!(shares.len(), 1);
    let profiles = &shares[0].profiles;
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].child_id, c2.id);
    assert!(profiles[0].can_view_completed);
}

#[tokio::test]
async fn test_reconfigure_updates_in_place_never_duplicates_pair() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let c1 = h.add_child(alex.id, "Mia");
    let ctx = h.ctx(&alex);

    let first = h
        .sharing
        .configure_sharing(
            &ctx,
            command_for(sam.id, vec![spec(c1.id, ChildPermissions::default())]),
        )
        .await
        .unwrap();
    let second = h
        .sharing
        .configure_sharing(
            &ctx,
            ShareConfigurationCommand {
                shared_with_user_id: sam.id,
                permission_level: PermissionLevel::ViewFuture,
                expires_at: None,
                profiles: vec![spec(c1.id, ChildPermissions::default())],
            },
        )
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.permission_level, PermissionLevel::ViewFuture);
    assert_eq!(h.sharing.get_user_shares(&ctx).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_shared_view_filters_status_and_redacts_notes() {
    // Registered visible, completed hidden, notes hidden.
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let c1 = h.add_child(alex.id, "Mia");
    h.add_activity(
        c1.id,
        ActivityStatus::Registered,
        Some("bring shoes"),
        None,
        None,
    );
    h.add_activity(c1.id, ActivityStatus::Completed, None, Some(5), None);

    h.sharing
        .configure_sharing(
            &h.ctx(&alex),
            command_for(
                sam.id,
                vec![spec(
                    c1.id,
                    ChildPermissions {
                        can_view_interested: false,
                        can_view_registered: true,
                        can_view_completed: false,
                        can_view_notes: false,
                    },
                )],
            ),
        )
        .await
        .unwrap();

    let views = h
        .sharing
        .get_shared_children(&h.ctx(&sam), None)
        .await
        .unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].activities.len(), 1);
    assert_eq!(views[0].activities[0].status, ActivityStatus::Registered);
    assert_eq!(views[0].activities[0].notes, None);
}

#[tokio::test]
async fn test_configure_with_unowned_child_fails_without_writes() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let own = h.add_child(alex.id, "Mia");
    let other = h.add_child(sam.id, "NotMine");

    let err = h
        .sharing
        .configure_sharing(
            &h.ctx(&alex),
            command_for(
                sam.id,
                vec![
                    spec(own.id, ChildPermissions::default()),
                    spec(other.id, ChildPermissions::default()),
                ],
            ),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    // All-or-nothing: nothing persisted, not even the valid child.
    assert!(
        h.sharing
            .get_user_shares(&h.ctx(&alex))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_zero_profile_relationship_shares_nothing() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    h.add_child(alex.id, "Mia");

    h.sharing
        .configure_sharing(&h.ctx(&alex), command_for(sam.id, vec![]))
        .await
        .unwrap();

    let views = h
        .sharing
        .get_shared_children(&h.ctx(&sam), None)
        .await
        .unwrap();
    assert!(views.is_empty());
}

#[tokio::test]
async fn test_removing_last_profile_deactivates_relationship() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let c1 = h.add_child(alex.id, "Mia");
    h.add_activity(c1.id, ActivityStatus::Registered, None, None, None);
    let ctx = h.ctx(&alex);

    let share = h
        .sharing
        .configure_sharing(
            &ctx,
            command_for(sam.id, vec![spec(c1.id, ChildPermissions::default())]),
        )
        .await
        .unwrap();

    h.sharing
        .remove_child_from_share(&ctx, share.id, c1.id)
        .await
        .unwrap();

    let stored = h.store.share(share.id).unwrap();
    assert!(!stored.is_active);
    assert!(
        h.sharing
            .get_shared_children(&h.ctx(&sam), None)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_cleanup_expired_shares_is_idempotent() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let c1 = h.add_child(alex.id, "Mia");

    h.sharing
        .configure_sharing(
            &h.ctx(&alex),
            ShareConfigurationCommand {
                shared_with_user_id: sam.id,
                permission_level: PermissionLevel::ViewAll,
                expires_at: Some(Utc::now() - Duration::hours(1)),
                profiles: vec![spec(c1.id, ChildPermissions::default())],
            },
        )
        .await
        .unwrap();

    assert_eq!(h.sharing.cleanup_expired_shares().await.unwrap(), 1);
    assert_eq!(h.sharing.cleanup_expired_shares().await.unwrap(), 0);
}

#[tokio::test]
async fn test_expired_relationship_is_invisible_to_viewer() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let c1 = h.add_child(alex.id, "Mia");
    h.add_activity(c1.id, ActivityStatus::Registered, None, None, None);

    h.sharing
        .configure_sharing(
            &h.ctx(&alex),
            ShareConfigurationCommand {
                shared_with_user_id: sam.id,
                permission_level: PermissionLevel::ViewAll,
                expires_at: Some(Utc::now() - Duration::minutes(1)),
                profiles: vec![spec(c1.id, ChildPermissions::default())],
            },
        )
        .await
        .unwrap();

    // No sweep has run; expiry is still honored at read time.
    assert!(
        h.sharing
            .get_shared_children(&h.ctx(&sam), None)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_self_share_is_rejected() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");

    let err = h
        .sharing
        .configure_sharing(&h.ctx(&alex), command_for(alex.id, vec![]))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_only_sharing_user_may_update() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");

    let share = h
        .sharing
        .configure_sharing(&h.ctx(&alex), command_for(sam.id, vec![]))
        .await
        .unwrap();

    let err = h
        .sharing
        .update_share(
            &h.ctx(&sam),
            share.id,
            UpdateShareRequest {
                permission_level: None,
                expires_at: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_revoking_share_notifies_viewer_and_audits() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let ctx = h.ctx(&alex);

    let share = h
        .sharing
        .configure_sharing(&ctx, command_for(sam.id, vec![]))
        .await
        .unwrap();

    h.sharing
        .update_share(
            &ctx,
            share.id,
            UpdateShareRequest {
                permission_level: None,
                expires_at: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();

    let actions = h.audit.actions();
    assert!(actions.contains(&"share.configured".to_string()));
    assert!(actions.contains(&"share.revoked".to_string()));

    let sent = h.notifier.sent();
    assert!(
        sent.iter()
            .any(|m| m.kind == kidtrack_core::traits::NotificationKind::ShareRevoked
                && m.recipient_email == "sam@example.com")
    );
}

#[tokio::test]
async fn test_duplicate_child_add_conflicts_and_missing_profile_updates_fail() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let c1 = h.add_child(alex.id, "Mia");
    let c2 = h.add_child(alex.id, "Theo");
    let ctx = h.ctx(&alex);

    let share = h
        .sharing
        .configure_sharing(
            &ctx,
            command_for(sam.id, vec![spec(c1.id, ChildPermissions::default())]),
        )
        .await
        .unwrap();

    let err = h
        .sharing
        .add_child_to_share(&ctx, share.id, spec(c1.id, ChildPermissions::default()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = h
        .sharing
        .update_child_permissions(&ctx, share.id, c2.id, ChildPermissions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = h
        .sharing
        .remove_child_from_share(&ctx, share.id, c2.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_has_access_to_child() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let pat = h.add_user("pat@example.com", "Pat");
    let c1 = h.add_child(alex.id, "Mia");

    h.sharing
        .configure_sharing(
            &h.ctx(&alex),
            command_for(sam.id, vec![spec(c1.id, ChildPermissions::default())]),
        )
        .await
        .unwrap();

    assert!(h.sharing.has_access_to_child(alex.id, c1.id).await.unwrap());
    assert!(h.sharing.has_access_to_child(sam.id, c1.id).await.unwrap());
    assert!(!h.sharing.has_access_to_child(pat.id, c1.id).await.unwrap());

    let err = h
        .sharing
        .has_access_to_child(sam.id, kidtrack_core::types::id::ChildId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_the_state_change() {
    let h = TestHarness::with_failing_notifier();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let c1 = h.add_child(alex.id, "Mia");

    let share = h
        .sharing
        .configure_sharing(
            &h.ctx(&alex),
            command_for(sam.id, vec![spec(c1.id, ChildPermissions::default())]),
        )
        .await
        .unwrap();

    assert!(h.store.share(share.id).unwrap().is_active);
}

#[tokio::test]
async fn test_view_future_tier_hides_past_sessions() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let c1 = h.add_child(alex.id, "Mia");
    let now = Utc::now();
    h.add_activity(
        c1.id,
        ActivityStatus::Registered,
        None,
        None,
        Some(now + Duration::days(5)),
    );
    h.add_activity(
        c1.id,
        ActivityStatus::Registered,
        None,
        None,
        Some(now - Duration::days(5)),
    );

    h.sharing
        .configure_sharing(
            &h.ctx(&alex),
            ShareConfigurationCommand {
                shared_with_user_id: sam.id,
                permission_level: PermissionLevel::ViewFuture,
                expires_at: None,
                profiles: vec![spec(c1.id, ChildPermissions::default())],
            },
        )
        .await
        .unwrap();

    let views = h
        .sharing
        .get_shared_children(&h.ctx(&sam), None)
        .await
        .unwrap();
    assert_eq!(views[0].activities.len(), 1);
    assert!(views[0].activities[0].activity.date_start.unwrap() > now);
}
