//! In-memory store implementations.
//!
//! DashMap-backed stand-ins for the hospital document store, used by the
//! server binary in standalone mode and by tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use carehub_core::types::id::{MeetingCode, MessageId};
use carehub_core::{AppError, AppResult};
use carehub_entity::meeting::Meeting;
use carehub_entity::message::{ChatMessage, ChatScope, Subtitle};

use super::{ChatMessageStore, MeetingStore};

/// In-memory chat message and subtitle store.
#[derive(Debug, Default)]
pub struct MemoryChatStore {
    messages: DashMap<MessageId, ChatMessage>,
    subtitles: DashMap<MeetingCode, Vec<Subtitle>>,
}

impl MemoryChatStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted messages.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

#[async_trait]
impl ChatMessageStore for MemoryChatStore {
    async fn persist(&self, message: &ChatMessage) -> AppResult<()> {
        self.messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn fetch(&self, id: MessageId) -> AppResult<Option<ChatMessage>> {
        Ok(self.messages.get(&id).map(|m| m.value().clone()))
    }

    async fn mark_delivered(&self, id: MessageId) -> AppResult<()> {
        match self.messages.get_mut(&id) {
            Some(mut m) => {
                m.mark_delivered();
                Ok(())
            }
            None => Err(AppError::not_found(format!("Message '{id}' not found"))),
        }
    }

    async fn mark_read(&self, id: MessageId, read_at: DateTime<Utc>) -> AppResult<bool> {
        match self.messages.get_mut(&id) {
            Some(mut m) => Ok(m.mark_read(read_at)),
            None => Err(AppError::not_found(format!("Message '{id}' not found"))),
        }
    }

    async fn history(&self, scope: &ChatScope) -> AppResult<Vec<ChatMessage>> {
        let mut messages: Vec<ChatMessage> = self
            .messages
            .iter()
            .filter(|m| m.scope == *scope)
            .map(|m| m.value().clone())
            .collect();
        messages.sort_by_key(|m| m.sent_at);
        Ok(messages)
    }

    async fn append_subtitle(&self, subtitle: &Subtitle) -> AppResult<()> {
        self.subtitles
            .entry(subtitle.meeting.clone())
            .or_default()
            .push(subtitle.clone());
        Ok(())
    }

    async fn subtitle_log(&self, meeting: &MeetingCode) -> AppResult<Vec<Subtitle>> {
        Ok(self
            .subtitles
            .get(meeting)
            .map(|log| log.value().clone())
            .unwrap_or_default())
    }
}

/// In-memory meeting metadata store.
#[derive(Debug, Default)]
pub struct MemoryMeetingStore {
    meetings: DashMap<MeetingCode, Meeting>,
}

impl MemoryMeetingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeetingStore for MemoryMeetingStore {
    async fn insert(&self, meeting: &Meeting) -> AppResult<()> {
        match self.meetings.entry(meeting.code.clone()) {
            dashmap::Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Meeting code '{}' is already taken",
                meeting.code
            ))),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(meeting.clone());
                Ok(())
            }
        }
    }

    async fn fetch(&self, code: &MeetingCode) -> AppResult<Option<Meeting>> {
        Ok(self.meetings.get(code).map(|m| m.value().clone()))
    }

    async fn update(&self, meeting: &Meeting) -> AppResult<()> {
        self.meetings.insert(meeting.code.clone(), meeting.clone());
        Ok(())
    }
}
