//! Meeting lifecycle and recording status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    /// Created but nobody has joined yet.
    Scheduled,
    /// At least one participant has joined.
    Active,
    /// Ended by the host, or implied when all participants left.
    Ended,
    /// Cancelled before anyone joined.
    Cancelled,
}

impl MeetingStatus {
    /// Whether participants may still join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Scheduled | Self::Active)
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Recording state of a meeting, toggled by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    /// Not recording.
    Idle,
    /// Recording in progress.
    Recording,
}

impl RecordingStatus {
    /// Flip between idle and recording.
    pub fn toggled(self) -> Self {
        match self {
            Self::Idle => Self::Recording,
            Self::Recording => Self::Idle,
        }
    }
}
