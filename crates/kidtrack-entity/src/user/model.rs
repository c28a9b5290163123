//! User entity model.
//!
//! Account identity is owned by the identity collaborator; the sharing core
//! only reads it to resolve viewers and invitation recipients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kidtrack_core::types::id::UserId;

/// A registered user account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Email address (stored lowercase).
    pub email: String,
    /// Display name.
    pub name: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

