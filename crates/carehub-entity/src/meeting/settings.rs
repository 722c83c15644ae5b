//! Per-meeting settings, adjustable by the host.

use serde::{Deserialize, Serialize};

/// Host-adjustable meeting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSettings {
    /// Whether participants may send chat messages.
    #[serde(default = "default_true")]
    pub allow_chat: bool,
    /// Whether participants may share their screen.
    #[serde(default = "default_true")]
    pub allow_screen_share: bool,
    /// Maximum participants, `None` for unlimited.
    #[serde(default)]
    pub max_participants: Option<u32>,
}

impl Default for MeetingSettings {
    fn default() -> Self {
        Self {
            allow_chat: true,
            allow_screen_share: true,
            max_participants: None,
        }
    }
}

fn default_true() -> bool {
    true
}
