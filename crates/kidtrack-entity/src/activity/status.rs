//! Scheduled-activity status.

use serde::{Deserialize, Serialize};

/// Status of a child's scheduled activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// The family has flagged interest but not registered.
    Interested,
    /// The child is registered for the activity.
    Registered,
    /// The activity has been completed.
    Completed,
    /// The registration was cancelled.
    Cancelled,
}
