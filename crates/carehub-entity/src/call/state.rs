//! Call session state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a two-party call.
///
/// A session is created directly in [`CallState::Ringing`]; the absence
/// of a session is the idle state. `Ended`, `Rejected`, and `Failed` are
/// terminal — the coordinator destroys the session when it reaches one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    /// The receiver has been notified and has not yet answered.
    Ringing,
    /// The receiver accepted and negotiation has been forwarded.
    Connected,
    /// A party hung up after the call connected, or cancelled the ring.
    Ended,
    /// The receiver declined while ringing.
    Rejected,
    /// The receiver became unresolvable or the ring expired.
    Failed,
}

impl CallState {
    /// Whether the session still occupies its call id.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Ringing | Self::Connected)
    }

    /// Whether the state permits an `accept` transition.
    pub fn can_accept(&self) -> bool {
        matches!(self, Self::Ringing)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ringing => "ringing",
            Self::Connected => "connected",
            Self::Ended => "ended",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
