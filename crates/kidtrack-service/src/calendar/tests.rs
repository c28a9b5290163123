//! Tests for the unified calendar projection.

use chrono::{Duration, Utc};

use kidtrack_entity::activity::ActivityStatus;
use kidtrack_entity::share::{ChildPermissions, PermissionLevel, ProfileSpec};

use crate::sharing::ShareConfigurationCommand;
use crate::testing::TestHarness;

#[tokio::test]
async fn test_unified_schedule_merges_own_and_shared_sorted_by_date() {
    let h = TestHarness::new();
    let alex = h.add_user("alex@example.com", "Alex");
    let sam = h.add_user("sam@example.com", "Sam");
    let own_child = h.add_child(sam.id, "Ruby");
    let shared_child = h.add_child(alex.id, "Mia");
    let now = Utc::now();

    // Sam's own child: notes stay visible.
    h.add_activity(
        own_child.id,
        ActivityStatus::Registered,
        Some("own notes"),
        None,
        Some(now + Duration::days(2)),
    );
    // Alex's shared child: notes are redacted by the sharing filter.
    h.add_activity(
        shared_child.id,
        ActivityStatus::Registered,
        Some("secret"),
        None,
        Some(now + Duration::days(1)),
    );

    h.sharing
        .configure_sharing(
            &h.ctx(&alex),
            ShareConfigurationCommand {
                shared_with_user_id: sam.id,
                permission_level: PermissionLevel::ViewAll,
                expires_at: None,
                profiles: vec![ProfileSpec {
                    child_id: shared_child.id,
                    permissions: ChildPermissions::default(),
                }],
            },
        )
        .await
        .unwrap();

    let entries = h
        .calendar
        .unified_schedule(&h.ctx(&sam), None, None)
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    // Shared entry starts first, so it sorts first.
    assert!(!entries[0].own);
    assert_eq!(entries[0].shared_by, Some(alex.id));
    assert_eq!(entries[0].notes, None);
    assert!(entries[1].own);
    assert_eq!(entries[1].notes.as_deref(), Some("own notes"));
}

#[tokio::test]
async fn test_range_filter_keeps_only_dated_entries_inside_window() {
    let h = TestHarness::new();
    let sam = h.add_user("sam@example.com", "Sam");
    let child = h.add_child(sam.id, "Ruby");
    let now = Utc::now();

    h.add_activity(
        child.id,
        ActivityStatus::Registered,
        None,
        None,
        Some(now + Duration::days(1)),
    );
    h.add_activity(
        child.id,
        ActivityStatus::Registered,
        None,
        None,
        Some(now + Duration::days(30)),
    );
    h.add_activity(child.id, ActivityStatus::Interested, None, None, None);

    let entries = h
        .calendar
        .unified_schedule(
            &h.ctx(&sam),
            Some(now),
            Some(now + Duration::days(7)),
        )
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert!(entries[0].activity.date_start.unwrap() <= now + Duration::days(7));
}
