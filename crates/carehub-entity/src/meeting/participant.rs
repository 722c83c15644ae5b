//! Meeting participant entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Role of a participant within one meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    /// The meeting creator; may run host-only controls.
    Host,
    /// Everyone else.
    Participant,
}

/// One participant's membership record.
///
/// Records are appended on join and marked departed on leave, never
/// removed, preserving an audit trail of who was in the meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Who this record belongs to.
    pub identity: Identity,
    /// Host or plain participant.
    pub role: ParticipantRole,
    /// When they joined.
    pub joined_at: DateTime<Utc>,
    /// When they left, if they have.
    pub left_at: Option<DateTime<Utc>>,
}

impl Participant {
    /// Create a fresh membership record.
    pub fn new(identity: Identity, role: ParticipantRole) -> Self {
        Self {
            identity,
            role,
            joined_at: Utc::now(),
            left_at: None,
        }
    }

    /// Whether the participant is currently in the meeting.
    pub fn is_active(&self) -> bool {
        self.left_at.is_none()
    }
}
