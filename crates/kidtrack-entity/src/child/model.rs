//! Child profile entity model.
//!
//! Children are created, updated, and soft-deleted by their owner through
//! the child-management collaborator. The sharing core never mutates them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kidtrack_core::types::id::{ChildId, UserId};

/// A child profile owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Child {
    /// Unique child identifier.
    pub id: ChildId,
    /// The owning user.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Date of birth (optional).
    pub date_of_birth: Option<NaiveDate>,
    /// Soft-delete flag.
    pub is_active: bool,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Child {
    /// Whether `user_id` owns this child.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}
