//! Scheduled-activity repository implementation (read-only to the sharing core).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use kidtrack_core::error::{AppError, ErrorKind};
use kidtrack_core::result::AppResult;
use kidtrack_core::types::id::{ActivityId, ChildActivityId, ChildId};
use kidtrack_entity::activity::{ActivityStatus, ActivitySummary, ScheduledActivity};

use crate::store::ActivityStore;

/// Repository for a child's scheduled activities, joined with catalog data.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

/// Flat join row; reshaped into [`ScheduledActivity`] before leaving the repo.
#[derive(Debug, FromRow)]
struct ScheduledActivityRow {
    id: ChildActivityId,
    child_id: ChildId,
    status: ActivityStatus,
    notes: Option<String>,
    rating: Option<i32>,
    registered_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    activity_id: ActivityId,
    activity_name: String,
    activity_category: Option<String>,
    activity_date_start: Option<DateTime<Utc>>,
    activity_location: Option<String>,
}

impl From<ScheduledActivityRow> for ScheduledActivity {
    fn from(row: ScheduledActivityRow) -> Self {
        Self {
            id: row.id,
            child_id: row.child_id,
            status: row.status,
            notes: row.notes,
            rating: row.rating,
            registered_at: row.registered_at,
            completed_at: row.completed_at,
            activity: ActivitySummary {
                id: row.activity_id,
                name: row.activity_name,
                category: row.activity_category,
                date_start: row.activity_date_start,
                location: row.activity_location,
            },
        }
    }
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityStore for ActivityRepository {
    async fn scheduled_for_child(&self, child_id: ChildId) -> AppResult<Vec<ScheduledActivity>> {
        let rows = sqlx::query_as::<_, ScheduledActivityRow>(
            "SELECT ca.id, ca.child_id, ca.status, ca.notes, ca.rating, \
             ca.registered_at, ca.completed_at, \
             a.id AS activity_id, a.name AS activity_name, a.category AS activity_category, \
             a.date_start AS activity_date_start, a.location AS activity_location \
             FROM child_activities ca \
             JOIN activities a ON a.id = ca.activity_id \
             WHERE ca.child_id = $1 \
             ORDER BY a.date_start ASC NULLS LAST",
        )
        .bind(child_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list scheduled activities", e)
        })?;

        Ok(rows.into_iter().map(ScheduledActivity::from).collect())
    }
}
