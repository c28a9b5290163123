//! Calendar service — merges a user's own children's schedules with the
//! shared activities they are permitted to see.
//!
//! Pure consumer of the sharing service's filtered output; it adds no
//! authority of its own. Shared activities arrive here already filtered
//! and notes-redacted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kidtrack_core::result::AppResult;
use kidtrack_core::types::id::{ChildId, UserId};
use kidtrack_database::store::{ActivityStore, ChildStore};
use kidtrack_entity::activity::{ActivityStatus, ActivitySummary};

use crate::context::RequestContext;
use crate::sharing::SharingService;

/// One row of the unified calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// The child this entry belongs to.
    pub child_id: ChildId,
    /// The child's display name.
    pub child_name: String,
    /// Whether the caller owns this child.
    pub own: bool,
    /// The sharing user, for entries that came through a share.
    pub shared_by: Option<UserId>,
    /// Schedule status.
    pub status: ActivityStatus,
    /// Parent notes (already redacted for shared entries).
    pub notes: Option<String>,
    /// The catalog activity.
    pub activity: ActivitySummary,
}

/// Builds the unified own + shared calendar view.
#[derive(Clone)]
pub struct CalendarService {
    /// Child lookups.
    children: Arc<dyn ChildStore>,
    /// Scheduled-activity lookups.
    activities: Arc<dyn ActivityStore>,
    /// Source of permitted shared activities.
    sharing: Arc<SharingService>,
}

impl CalendarService {
    /// Creates a new calendar service.
    pub fn new(
        children: Arc<dyn ChildStore>,
        activities: Arc<dyn ActivityStore>,
        sharing: Arc<SharingService>,
    ) -> Self {
        Self {
            children,
            activities,
            sharing,
        }
    }

    /// The caller's merged schedule: every activity of their own children,
    /// plus every shared activity they are permitted to see, sorted by
    /// start date (undated entries last).
    ///
    /// When a date range is given, only entries dated inside it are kept.
    pub async fn unified_schedule(
        &self,
        ctx: &RequestContext,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<CalendarEntry>> {
        let mut entries = Vec::new();

        for child in self.children.find_active_by_owner(ctx.user_id).await? {
            for scheduled in self.activities.scheduled_for_child(child.id).await? {
                entries.push(CalendarEntry {
                    child_id: child.id,
                    child_name: child.name.clone(),
                    own: true,
                    shared_by: None,
                    status: scheduled.status,
                    notes: scheduled.notes,
                    activity: scheduled.activity,
                });
            }
        }

        for view in self.sharing.get_shared_children(ctx, None).await? {
            for scheduled in view.activities {
                entries.push(CalendarEntry {
                    child_id: view.child.id,
                    child_name: view.child.name.clone(),
                    own: false,
                    shared_by: Some(view.shared_by),
                    status: scheduled.status,
                    notes: scheduled.notes,
                    activity: scheduled.activity,
                });
            }
        }

        if from.is_some() || to.is_some() {
            entries.retain(|entry| match entry.activity.date_start {
                Some(date) => {
                    from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t)
                }
                None => false,
            });
        }

        entries.sort_by_key(|entry| {
            (
                entry.activity.date_start.is_none(),
                entry.activity.date_start,
            )
        });

        Ok(entries)
    }
}

impl std::fmt::Debug for CalendarService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarService").finish()
    }
}
