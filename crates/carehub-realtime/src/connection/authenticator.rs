//! Token authentication — decodes a JWT from the upgrade request into a
//! connection identity.
//!
//! Token issuance belongs to the surrounding hospital backend; this side
//! only verifies.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use carehub_core::config::auth::AuthConfig;
use carehub_core::{AppError, AppResult};
use carehub_entity::identity::{Identity, UserRole};

/// JWT claims expected on CareHub access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Display name.
    pub name: String,
    /// Role tag (`clinician`, `patient`, `admin`).
    pub role: String,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

/// Verifies access tokens and extracts the connection identity.
pub struct TokenAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator").finish()
    }
}

impl TokenAuthenticator {
    /// Creates an authenticator from the auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Decode and verify a token, returning the identity it asserts.
    pub fn authenticate(&self, token: &str) -> AppResult<Identity> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AppError::authentication(format!("Invalid token: {e}")))?;

        let role: UserRole = data.claims.role.parse()?;
        Ok(Identity::new(data.claims.sub, role, data.claims.name))
    }
}
