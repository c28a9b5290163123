//! The two-stage activity filter plus the tier filter stage.
//!
//! Stage 1 keeps an activity only if its status maps to a permitted flag.
//! Stage 2 redacts notes when `can_view_notes` is false (the activity
//! itself is never dropped for that reason). The tier stage then applies
//! the relationship-wide policy; only `view_future` adds behavior.

use chrono::{DateTime, Utc};

use kidtrack_entity::activity::{ActivityStatus, ScheduledActivity};
use kidtrack_entity::share::{ChildPermissions, PermissionLevel};

/// Which permission flag controls a visible status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityFlag {
    /// Controlled by `can_view_interested`.
    Interested,
    /// Controlled by `can_view_registered`.
    Registered,
    /// Controlled by `can_view_completed`.
    Completed,
}

/// Closed mapping from activity status to the flag that may expose it.
///
/// `Cancelled` — and any status added later — maps to `None`: never shown
/// to viewers. Adding a new visible status requires a deliberate new arm
/// here, not a default.
pub fn visibility_flag(status: ActivityStatus) -> Option<VisibilityFlag> {
    match status {
        ActivityStatus::Interested => Some(VisibilityFlag::Interested),
        ActivityStatus::Registered => Some(VisibilityFlag::Registered),
        ActivityStatus::Completed => Some(VisibilityFlag::Completed),
        ActivityStatus::Cancelled => None,
    }
}

/// Whether `permissions` allow a given flag.
fn allows(permissions: &ChildPermissions, flag: VisibilityFlag) -> bool {
    match flag {
        VisibilityFlag::Interested => permissions.can_view_interested,
        VisibilityFlag::Registered => permissions.can_view_registered,
        VisibilityFlag::Completed => permissions.can_view_completed,
    }
}

/// Stage 1 + 2: status filter, then notes redaction.
pub fn apply_permissions(
    activities: Vec<ScheduledActivity>,
    permissions: &ChildPermissions,
) -> Vec<ScheduledActivity> {
    activities
        .into_iter()
        .filter(|activity| {
            visibility_flag(activity.status).is_some_and(|flag| allows(permissions, flag))
        })
        .map(|mut activity| {
            if !permissions.can_view_notes {
                activity.notes = None;
            }
            activity
        })
        .collect()
}

/// The tier filter stage.
///
/// `ViewAll` and `ViewRegistered` are deliberate no-ops: neither tier
/// carries behavior beyond the per-child flags today, and keeping them as
/// explicit arms isolates that open product question to this one match.
/// `ViewFuture` keeps only activities whose catalog start is strictly in
/// the future.
pub fn apply_tier(
    tier: PermissionLevel,
    activities: Vec<ScheduledActivity>,
    now: DateTime<Utc>,
) -> Vec<ScheduledActivity> {
    match tier {
        PermissionLevel::ViewAll | PermissionLevel::ViewRegistered => activities,
        PermissionLevel::ViewFuture => activities
            .into_iter()
            .filter(|activity| activity.starts_after(now))
            .collect(),
    }
}

/// The complete filter pipeline applied to one child's schedule.
pub fn apply(
    activities: Vec<ScheduledActivity>,
    permissions: &ChildPermissions,
    tier: PermissionLevel,
    now: DateTime<Utc>,
) -> Vec<ScheduledActivity> {
    apply_tier(tier, apply_permissions(activities, permissions), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use kidtrack_core::types::id::{ActivityId, ChildActivityId, ChildId};
    use kidtrack_entity::activity::ActivitySummary;

    fn activity(
        status: ActivityStatus,
        notes: Option<&str>,
        date_start: Option<DateTime<Utc>>,
    ) -> ScheduledActivity {
        ScheduledActivity {
            id: ChildActivityId::new(),
            child_id: ChildId::new(),
            status,
            notes: notes.map(str::to_string),
            rating: None,
            registered_at: None,
            completed_at: None,
            activity: ActivitySummary {
                id: ActivityId::new(),
                name: "Swim Level 2".to_string(),
                category: Some("swimming".to_string()),
                date_start,
                location: None,
            },
        }
    }

    fn all_visible() -> ChildPermissions {
        ChildPermissions {
            can_view_interested: true,
            can_view_registered: true,
            can_view_completed: true,
            can_view_notes: true,
        }
    }

    #[test]
    fn test_cancelled_is_never_visible() {
        let filtered = apply_permissions(
            vec![activity(ActivityStatus::Cancelled, None, None)],
            &all_visible(),
        );
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_status_filter_follows_flags() {
        let permissions = ChildPermissions {
            can_view_interested: false,
            can_view_registered: true,
            can_view_completed: false,
            can_view_notes: true,
        };
        let filtered = apply_permissions(
            vec![
                activity(ActivityStatus::Interested, None, None),
                activity(ActivityStatus::Registered, None, None),
                activity(ActivityStatus::Completed, None, None),
            ],
            &permissions,
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].status, ActivityStatus::Registered);
    }

    #[test]
    fn test_notes_are_redacted_not_dropped() {
        let permissions = ChildPermissions {
            can_view_notes: false,
            ..all_visible()
        };
        let filtered = apply_permissions(
            vec![activity(ActivityStatus::Registered, Some("bring shoes"), None)],
            &permissions,
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].notes, None);
    }

    #[test]
    fn test_notes_survive_when_permitted() {
        let filtered = apply_permissions(
            vec![activity(ActivityStatus::Registered, Some("bring shoes"), None)],
            &all_visible(),
        );
        assert_eq!(filtered[0].notes.as_deref(), Some("bring shoes"));
    }

    #[test]
    fn test_view_future_drops_past_and_undated() {
        let now = Utc::now();
        let activities = vec![
            activity(
                ActivityStatus::Registered,
                None,
                Some(now + Duration::days(3)),
            ),
            activity(
                ActivityStatus::Registered,
                None,
                Some(now - Duration::days(3)),
            ),
            activity(ActivityStatus::Registered, None, None),
        ];
        let filtered = apply_tier(PermissionLevel::ViewFuture, activities, now);
        assert_eq!(filtered.len(), 1);
        assert!(filtered[0].activity.date_start.unwrap() > now);
    }

    #[test]
    fn test_view_all_and_view_registered_are_identical_no_ops() {
        let now = Utc::now();
        let activities = vec![
            activity(
                ActivityStatus::Registered,
                None,
                Some(now - Duration::days(3)),
            ),
            activity(ActivityStatus::Completed, None, None),
        ];
        let via_all = apply_tier(PermissionLevel::ViewAll, activities.clone(), now);
        let via_registered = apply_tier(PermissionLevel::ViewRegistered, activities.clone(), now);
        assert_eq!(via_all.len(), activities.len());
        assert_eq!(via_registered.len(), activities.len());
    }

    #[test]
    fn test_full_pipeline_scenario() {
        // Registered activity with notes + completed rated activity, shown
        // to a viewer with registered-only, notes-hidden permissions.
        let now = Utc::now();
        let permissions = ChildPermissions {
            can_view_interested: false,
            can_view_registered: true,
            can_view_completed: false,
            can_view_notes: false,
        };
        let mut completed = activity(ActivityStatus::Completed, None, None);
        completed.rating = Some(5);
        let activities = vec![
            activity(ActivityStatus::Registered, Some("bring shoes"), None),
            completed,
        ];
        let filtered = apply(activities, &permissions, PermissionLevel::ViewAll, now);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].status, ActivityStatus::Registered);
        assert_eq!(filtered[0].notes, None);
    }
}
