//! Token verification configuration.
//!
//! Token issuance (login, refresh, sessions) belongs to the identity
//! collaborator; this service only verifies access tokens it is handed.

use serde::{Deserialize, Serialize};

/// JWT verification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret for access-token verification.
    pub jwt_secret: String,
    /// Expected token issuer.
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_issuer() -> String {
    "kidtrack".to_string()
}
