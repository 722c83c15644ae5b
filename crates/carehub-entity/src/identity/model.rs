//! Identity value object.

use serde::{Deserialize, Serialize};

use carehub_core::types::id::UserId;

use super::role::UserRole;

/// A stable logical user reference.
///
/// Supplied by the external auth collaborator (JWT claims or a `join`
/// announcement); never minted by this core. Independent of any
/// particular connection — the same identity survives reconnects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque stable user id.
    pub user_id: UserId,
    /// Role tag.
    pub role: UserRole,
    /// Human-readable display name.
    pub display_name: String,
}

impl Identity {
    /// Create a new identity.
    pub fn new(user_id: impl Into<UserId>, role: UserRole, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            display_name: display_name.into(),
        }
    }
}
