//! Presence snapshot value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// A serializable snapshot of one online user.
///
/// This is a weak view derived from the live presence registry; holding
/// one never keeps a connection (or anything else) alive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceInfo {
    /// Who is online.
    pub identity: Identity,
    /// When the current connection was established.
    pub connected_at: DateTime<Utc>,
}
