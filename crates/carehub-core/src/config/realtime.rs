//! Real-time communication core configuration.

use serde::{Deserialize, Serialize};

/// Settings for the real-time engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound message buffer size per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Seconds a ringing call waits for an answer before it is
    /// auto-expired. `0` disables the timeout (the call rings until a
    /// party acts or disconnects).
    #[serde(default = "default_answer_timeout")]
    pub answer_timeout_seconds: u64,
    /// Maximum attempts to generate a unique meeting code before the
    /// create operation fails with a conflict.
    #[serde(default = "default_code_attempts")]
    pub meeting_code_attempts: u32,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            answer_timeout_seconds: default_answer_timeout(),
            meeting_code_attempts: default_code_attempts(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_answer_timeout() -> u64 {
    60
}

fn default_code_attempts() -> u32 {
    8
}
