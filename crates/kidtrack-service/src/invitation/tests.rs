//! Service-level tests for the invitation workflow.

use kidtrack_core::config::sharing::SharingConfig;
use kidtrack_core::error::ErrorKind;
use kidtrack_core::traits::NotificationKind;
use kidtrack_entity::invitation::InvitationStatus;
use kidtrack_entity::share::{ChildPermissions, PermissionLevel, ProfileSpec};

use super::service::CreateInvitationRequest;
use crate::sharing::{ShareConfigurationCommand, UpdateShareRequest};
use crate::testing::TestHarness;

fn request(email: &str) -> CreateInvitationRequest {
    CreateInvitationRequest {
        recipient_email: email.to_string(),
        message: None,
        expires_in_days: None,
    }
}

#[tokio::test]
async fn test_create_invitation_persists_pending_and_notifies() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");

    let invitation = h
        .invitations
        .create_invitation(&h.ctx(&alex), request("  Grandma@Example.COM "))
        .await
        .unwrap();

    assert_eq!(invitation.status, InvitationStatus::Pending);
    assert_eq!(invitation.recipient_email, "grandma@example.com");
    assert!(!invitation.token.is_empty());

    assert!(h.audit.actions().contains(&"invitation.created".to_string()));
    let sent = h.notifier.sent();
    assert!(
        sent.iter().any(|m| m.kind == NotificationKind::InvitationSent
            && m.recipient_email == "grandma@example.com")
    );
}

#[tokio::test]
async fn test_self_invite_is_rejected() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");

    let err = h
        .invitations
        .create_invitation(&h.ctx(&alex), request("ALEX@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_duplicate_pending_invitation_is_rejected() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let ctx = h.ctx(&alex);

    h.invitations
        .create_invitation(&ctx, request("grandma@example.com"))
        .await
        .unwrap();
    let err = h
        .invitations
        .create_invitation(&ctx, request("grandma@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_pending_cap_is_enforced() {
    let h = TestHarness::with_config(SharingConfig {
        pending_invitation_cap: 2,
        ..SharingConfig::default()
    });
    let alex = h.add_user("alex@example.com", "Alex");
    let ctx = h.ctx(&alex);

    h.invitations
        .create_invitation(&ctx, request("one@example.com"))
        .await
        .unwrap();
    h.invitations
        .create_invitation(&ctx, request("two@example.com"))
        .await
        .unwrap();
    let err = h
        .invitations
        .create_invitation(&ctx, request("three@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::LimitExceeded);
}

#[tokio::test]
async fn test_invite_blocked_while_share_is_active() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let ctx = h.ctx(&alex);

    h.sharing
        .configure_sharing(
            &ctx,
            ShareConfigurationCommand {
                shared_with_user_id: sam.id,
                permission_level: PermissionLevel::ViewAll,
                expires_at: None,
                profiles: vec![],
            },
        )
        .await
        .unwrap();

    let err = h
        .invitations
        .create_invitation(&ctx, request("sam@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_accept_requires_matching_email() {
    // Invitation addressed to y@example.com; a user registered under a
    // different address may not accept it.
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let z = h.add_user("z@example.com", "Zoe");

    let invitation = h
        .invitations
        .create_invitation(&h.ctx(&alex), request("y@example.com"))
        .await
        .unwrap();

    let err = h
        .invitations
        .accept_invitation(&h.ctx(&z), &invitation.token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    // Still pending: the failed attempt consumed nothing.
    assert_eq!(
        h.store.invitation(invitation.id).unwrap().status,
        InvitationStatus::Pending
    );
}

#[tokio::test]
async fn test_accepting_expired_invitation_fails_and_persists_expiry() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let gran = h.add_user("grandma@example.com", "Gran");

    let invitation = h
        .invitations
        .create_invitation(
            &h.ctx(&alex),
            CreateInvitationRequest {
                recipient_email: "grandma@example.com".to_string(),
                message: None,
                expires_in_days: Some(0),
            },
        )
        .await
        .unwrap();

    let err = h
        .invitations
        .accept_invitation(&h.ctx(&gran), &invitation.token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Expired);

    // The failed call recorded the lapse.
    assert_eq!(
        h.store.invitation(invitation.id).unwrap().status,
        InvitationStatus::Expired
    );
}

#[tokio::test]
async fn test_accept_provisions_share_with_default_tier_and_no_profiles() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let gran = h.add_user("grandma@example.com", "Gran");

    let invitation = h
        .invitations
        .create_invitation(&h.ctx(&alex), request("grandma@example.com"))
        .await
        .unwrap();

    let acceptance = h
        .invitations
        .accept_invitation(&h.ctx(&gran), &invitation.token)
        .await
        .unwrap();

    assert_eq!(acceptance.invitation.status, InvitationStatus::Accepted);
    assert_eq!(acceptance.invitation.recipient_user_id, Some(gran.id));
    assert!(acceptance.invitation.accepted_at.is_some());

    let relationship = &acceptance.relationship;
    assert_eq!(relationship.sharing_user_id, alex.id);
    assert_eq!(relationship.shared_with_user_id, gran.id);
    assert_eq!(
        relationship.permission_level,
        PermissionLevel::ViewRegistered
    );
    assert!(relationship.is_active);

    // Acceptance alone grants no data access.
    assert!(
        h.sharing
            .get_shared_children(&h.ctx(&gran), None)
            .await
            .unwrap()
            .is_empty()
    );

    assert!(h.audit.actions().contains(&"invitation.accepted".to_string()));
    assert!(
        h.notifier
            .sent()
            .iter()
            .any(|m| m.kind == NotificationKind::InvitationAccepted
                && m.recipient_email == "alex@example.com")
    );
}

#[tokio::test]
async fn test_accept_reactivates_existing_share_without_touching_its_config() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let gran = h.add_user("grandma@example.com", "Gran");
    let c1 = h.add_child(alex.id, "Mia");
    let ctx = h.ctx(&alex);

    let share = h
        .sharing
        .configure_sharing(
            &ctx,
            ShareConfigurationCommand {
                shared_with_user_id: gran.id,
                permission_level: PermissionLevel::ViewAll,
                expires_at: None,
                profiles: vec![ProfileSpec {
                    child_id: c1.id,
                    permissions: ChildPermissions::default(),
                }],
            },
        )
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

    let invitation = h
        .invitations
        .create_invitation(&ctx, request("grandma@example.com"))
        .await
        .unwrap();
    let acceptance = h
        .invitations
        .accept_invitation(&h.ctx(&gran), &invitation.token)
        .await
        .unwrap();

    // Same row, reactivated, configuration preserved.
    assert_eq!(acceptance.relationship.id, share.id);
    assert!(acceptance.relationship.is_active);
    assert_eq!(
        acceptance.relationship.permission_level,
        PermissionLevel::ViewAll
    );
    let shares = h.sharing.get_user_shares(&ctx).await.unwrap();
    assert_eq!(shares[0].profiles.len(), 1);
}

#[tokio::test]
async fn test_decline_is_terminal_and_guarded_by_recipient_email() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let gran = h.add_user("grandma@example.com", "Gran");
    let other = h.add_user("other@example.com", "Other");

    let invitation = h
        .invitations
        .create_invitation(&h.ctx(&alex), request("grandma@example.com"))
        .await
        .unwrap();

    let err = h
        .invitations
        .decline_invitation(&h.ctx(&other), &invitation.token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let declined = h
        .invitations
        .decline_invitation(&h.ctx(&gran), &invitation.token)
        .await
        .unwrap();
    assert_eq!(declined.status, InvitationStatus::Declined);

    // Terminal: a later accept must fail.
    let err = h
        .invitations
        .accept_invitation(&h.ctx(&gran), &invitation.token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_cancel_requires_sender() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");

    let invitation = h
        .invitations
        .create_invitation(&h.ctx(&alex), request("grandma@example.com"))
        .await
        .unwrap();

    let err = h
        .invitations
        .cancel_invitation(&h.ctx(&sam), invitation.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let cancelled = h
        .invitations
        .cancel_invitation(&h.ctx(&alex), invitation.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, InvitationStatus::Cancelled);

    assert!(h.audit.actions().contains(&"invitation.cancelled".to_string()));
}

#[tokio::test]
async fn test_cleanup_expired_invitations_is_idempotent() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");

    h.invitations
        .create_invitation(
            &h.ctx(&alex),
            CreateInvitationRequest {
                recipient_email: "grandma@example.com".to_string(),
                message: None,
                expires_in_days: Some(0),
            },
        )
        .await
        .unwrap();

    assert_eq!(
        h.invitations.cleanup_expired_invitations().await.unwrap(),
        1
    );
    assert_eq!(
        h.invitations.cleanup_expired_invitations().await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let h = TestHarness::new();
    let gran = h.add_user("grandma@example.com", "Gran");

    let err = h
        .invitations
        .accept_invitation(&h.ctx(&gran), "no-such-token")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_stale_expired_pending_row_does_not_block_reinvite() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let ctx = h.ctx(&alex);

    let stale = h
        .invitations
        .create_invitation(
            &ctx,
            CreateInvitationRequest {
                recipient_email: "grandma@example.com".to_string(),
                message: None,
                expires_in_days: Some(0),
            },
        )
        .await
        .unwrap();

    // The sweep has not run, but a fresh invite still goes through and the
    // stale row is persisted as expired on the way.
    let fresh = h
        .invitations
        .create_invitation(&ctx, request("grandma@example.com"))
        .await
        .unwrap();

    assert_eq!(
        h.store.invitation(stale.id).unwrap().status,
        InvitationStatus::Expired
    );
    assert_eq!(fresh.status, InvitationStatus::Pending);
}
