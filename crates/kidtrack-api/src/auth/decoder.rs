//! JWT decoding and validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use kidtrack_core::config::auth::AuthConfig;
use kidtrack_core::error::AppError;
use kidtrack_core::result::AppResult;

use super::claims::Claims;

/// Verifies access tokens issued by the identity collaborator.
pub struct JwtDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl JwtDecoder {
    /// Create a decoder from configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate an access token.
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::authentication(format!("Invalid access token: {e}")))
    }
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header};
    use uuid::Uuid;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            issuer: "kidtrack".to_string(),
        }
    }

    fn token(secret: &str, iss: &str, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "parent@example.com".to_string(),
            iss: iss.to_string(),
            iat: now,
            exp: now + exp_offset,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode")
    }

    #[test]
    fn test_valid_token_decodes() {
        let decoder = JwtDecoder::new(&config());
        let claims = decoder.decode(&token("test-secret", "kidtrack", 3600)).unwrap();
        assert_eq!(claims.email, "parent@example.com");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let decoder = JwtDecoder::new(&config());
        assert!(decoder.decode(&token("other", "kidtrack", 3600)).is_err());
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let decoder = JwtDecoder::new(&config());
        assert!(decoder.decode(&token("test-secret", "someone", 3600)).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let decoder = JwtDecoder::new(&config());
        assert!(decoder.decode(&token("test-secret", "kidtrack", -3600)).is_err());
    }
}
