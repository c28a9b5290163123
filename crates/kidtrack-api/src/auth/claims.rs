//! Access-token claims.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kidtrack_core::types::id::UserId;

/// Claims carried by an access token from the identity collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's ID.
    pub sub: Uuid,
    /// The user's registered email.
    pub email: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

impl Claims {
    /// The subject as a typed user ID.
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }
}
