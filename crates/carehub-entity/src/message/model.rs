//! Chat message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carehub_core::types::id::{CallId, MeetingCode, MessageId, UserId};

use super::translation::Translation;

/// Where a chat message was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ChatScope {
    /// A two-party call.
    Call(CallId),
    /// An N-party meeting.
    Meeting(MeetingCode),
}

/// A persisted chat message.
///
/// Content is immutable once created; only the delivery-status flags
/// mutate, each exactly once and monotonically false→true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message id.
    pub id: MessageId,
    /// The call or meeting this message belongs to.
    pub scope: ChatScope,
    /// Sender user id.
    pub sender: UserId,
    /// Receiver user id for direct messages; `None` for meeting-wide.
    pub receiver: Option<UserId>,
    /// Message text.
    pub text: String,
    /// Pre-computed translations.
    pub translations: Vec<Translation>,
    /// When the sender sent it.
    pub sent_at: DateTime<Utc>,
    /// Whether the receiver was resolvable at send time. Optimistic
    /// flag, not an acknowledgment.
    pub is_delivered: bool,
    /// Whether the receiver marked it read.
    pub is_read: bool,
    /// When the receiver marked it read.
    pub read_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Create a new undelivered, unread message.
    pub fn new(
        scope: ChatScope,
        sender: UserId,
        receiver: Option<UserId>,
        text: impl Into<String>,
        translations: Vec<Translation>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            scope,
            sender,
            receiver,
            text: text.into(),
            translations,
            sent_at: Utc::now(),
            is_delivered: false,
            is_read: false,
            read_at: None,
        }
    }

    /// Flip the delivered flag. Monotonic: repeated calls are no-ops.
    pub fn mark_delivered(&mut self) {
        self.is_delivered = true;
    }

    /// Flip the read flag. Returns `false` if the message was already
    /// read (the flag mutates exactly once).
    pub fn mark_read(&mut self, read_at: DateTime<Utc>) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.read_at = Some(read_at);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ChatMessage {
        ChatMessage::new(
            ChatScope::Call(CallId::new("appt-1")),
            UserId::new("dr-a"),
            Some(UserId::new("pt-b")),
            "Your results are in.",
            Vec::new(),
        )
    }

    #[test]
    fn test_new_message_flags_start_false() {
        let m = message();
        assert!(!m.is_delivered);
        assert!(!m.is_read);
        assert!(m.read_at.is_none());
    }

    #[test]
    fn test_mark_read_exactly_once() {
        let mut m = message();
        let first = Utc::now();
        assert!(m.mark_read(first));
        assert!(!m.mark_read(Utc::now()));
        assert_eq!(m.read_at, Some(first));
    }

    #[test]
    fn test_scope_serde_tagging() {
        let json = serde_json::to_string(&ChatScope::Meeting(MeetingCode::new("abc-12-x"))).unwrap();
        assert_eq!(json, r#"{"kind":"meeting","id":"abc-12-x"}"#);
    }
}
