//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Settings for the connection-level token authenticator.
///
/// When `require_token` is enabled, WebSocket upgrades must carry a JWT
/// issued by the surrounding hospital backend; the decoded claims become
/// the connection identity. When disabled, clients announce their
/// identity with a `join` event after connecting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to verify JWT signatures.
    #[serde(default = "default_secret")]
    pub jwt_secret: String,
    /// Whether a valid token is required to open a connection.
    #[serde(default)]
    pub require_token: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_secret(),
            require_token: false,
        }
    }
}

fn default_secret() -> String {
    "change-me-in-production".to_string()
}
