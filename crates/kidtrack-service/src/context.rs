//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kidtrack_core::types::id::UserId;

/// Context for the current authenticated request.
///
/// Extracted by the API layer from verified token claims and passed into
/// service methods so every operation knows *who* is acting. The email is
/// the caller's registered address as attested by the identity
/// collaborator; the invitation guards compare against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The authenticated user's registered email.
    pub email: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, email: String) -> Self {
        Self {
            user_id,
            email,
            request_time: Utc::now(),
        }
    }
}
