//! # carehub-store
//!
//! Persistence collaborator interfaces consumed by the real-time core,
//! plus an in-memory reference implementation used by the server binary
//! and tests.
//!
//! The document store backing the wider hospital application is out of
//! scope; the core only ever talks to it through these narrow traits
//! ("persist chat message", "fetch meeting metadata").

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use carehub_core::types::id::{MeetingCode, MessageId};
use carehub_core::AppResult;
use carehub_entity::meeting::Meeting;
use carehub_entity::message::{ChatMessage, ChatScope, Subtitle};

pub use memory::{MemoryChatStore, MemoryMeetingStore};

/// Durability and delivery-status tracking for chat messages and
/// subtitle logs.
#[async_trait]
pub trait ChatMessageStore: Send + Sync + 'static {
    /// Persist a freshly created message.
    async fn persist(&self, message: &ChatMessage) -> AppResult<()>;

    /// Fetch a message by id.
    async fn fetch(&self, id: MessageId) -> AppResult<Option<ChatMessage>>;

    /// Record that the message reached a live connection.
    async fn mark_delivered(&self, id: MessageId) -> AppResult<()>;

    /// Record that the receiver read the message. Returns `false` if it
    /// was already read (the flag flips exactly once).
    async fn mark_read(&self, id: MessageId, read_at: DateTime<Utc>) -> AppResult<bool>;

    /// All messages in a call or meeting, oldest first.
    async fn history(&self, scope: &ChatScope) -> AppResult<Vec<ChatMessage>>;

    /// Append a subtitle to its meeting's log.
    async fn append_subtitle(&self, subtitle: &Subtitle) -> AppResult<()>;

    /// The subtitle log of a meeting, oldest first.
    async fn subtitle_log(&self, meeting: &MeetingCode) -> AppResult<Vec<Subtitle>>;
}

/// Meeting metadata persistence.
#[async_trait]
pub trait MeetingStore: Send + Sync + 'static {
    /// Persist a newly created meeting. Fails with a conflict if the
    /// code is already taken.
    async fn insert(&self, meeting: &Meeting) -> AppResult<()>;

    /// Fetch a meeting by its code.
    async fn fetch(&self, code: &MeetingCode) -> AppResult<Option<Meeting>>;

    /// Overwrite a meeting's persisted state.
    async fn update(&self, meeting: &Meeting) -> AppResult<()>;
}
