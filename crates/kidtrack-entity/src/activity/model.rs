//! Scheduled activity model.
//!
//! Scheduled activities are written by the activity-management collaborator
//! and read-only to the sharing core, which filters and projects them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kidtrack_core::types::id::{ActivityId, ChildActivityId, ChildId};

use super::status::ActivityStatus;

/// Catalog data carried alongside a scheduled activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// Catalog activity identifier.
    pub id: ActivityId,
    /// Activity name as scraped from the recreation listing.
    pub name: String,
    /// Category (swimming, arts, …) if known.
    pub category: Option<String>,
    /// Session start, if the listing carried one.
    pub date_start: Option<DateTime<Utc>>,
    /// Venue, if known.
    pub location: Option<String>,
}

/// A child's link to a catalog activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledActivity {
    /// Unique link identifier.
    pub id: ChildActivityId,
    /// The child this schedule entry belongs to.
    pub child_id: ChildId,
    /// Current status.
    pub status: ActivityStatus,
    /// Free-form parent notes.
    pub notes: Option<String>,
    /// Parent rating (1–5).
    pub rating: Option<i32>,
    /// When the child was registered.
    pub registered_at: Option<DateTime<Utc>>,
    /// When the activity was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// The catalog activity being scheduled.
    pub activity: ActivitySummary,
}

impl ScheduledActivity {
    /// Whether the underlying catalog session starts strictly after `now`.
    ///
    /// A schedule entry with no known start date is never considered future.
    pub fn starts_after(&self, now: DateTime<Utc>) -> bool {
        self.activity.date_start.is_some_and(|start| start > now)
    }
}
