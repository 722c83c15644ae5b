//! Chat & subtitle relay.
//!
//! Durability before delivery: every chat message is persisted through
//! the store collaborator before any connection sees it. The delivered
//! flag records whether the receiver resolved to a live connection at
//! send time — it is optimistic, not an acknowledgment; receivers never
//! ack back to the relay.

use std::sync::Arc;

use chrono::Utc;

use carehub_core::types::id::{MeetingCode, MessageId, UserId};
use carehub_core::{AppError, AppResult};
use carehub_entity::identity::Identity;
use carehub_entity::message::{ChatMessage, ChatScope, Subtitle, Translation};
use carehub_store::ChatMessageStore;

use crate::message::types::ServerEvent;
use crate::presence::registry::PresenceRegistry;
use crate::room::coordinator::RoomCoordinator;

/// Delivers chat messages, subtitles, and typing indicators.
pub struct ChatRelay {
    presence: Arc<PresenceRegistry>,
    rooms: Arc<RoomCoordinator>,
    store: Arc<dyn ChatMessageStore>,
}

impl std::fmt::Debug for ChatRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRelay").finish()
    }
}

impl ChatRelay {
    /// Creates a relay.
    pub fn new(
        presence: Arc<PresenceRegistry>,
        rooms: Arc<RoomCoordinator>,
        store: Arc<dyn ChatMessageStore>,
    ) -> Self {
        Self {
            presence,
            rooms,
            store,
        }
    }

    /// Send a chat message: persist first, then deliver.
    ///
    /// Direct messages (`receiver` set) go to that identity's live
    /// connection. Meeting-scoped messages without a receiver broadcast
    /// to every other current participant. Returns the persisted
    /// message, flags included.
    pub async fn send_chat(
        &self,
        sender: &Identity,
        scope: ChatScope,
        receiver: Option<UserId>,
        text: String,
        translations: Vec<Translation>,
    ) -> AppResult<ChatMessage> {
        if text.trim().is_empty() {
            return Err(AppError::validation("Chat message text is empty"));
        }

        if let ChatScope::Meeting(meeting_code) = &scope {
            let meeting = self
                .rooms
                .meeting(meeting_code)
                .ok_or_else(|| AppError::not_found(format!("Meeting '{meeting_code}' not found")))?;
            if !meeting
                .active_participants()
                .any(|p| p.identity.user_id == sender.user_id)
            {
                return Err(AppError::validation(format!(
                    "'{}' is not in meeting '{meeting_code}'",
                    sender.user_id
                )));
            }
            if !meeting.settings.allow_chat {
                return Err(AppError::authorization(format!(
                    "Chat is disabled in meeting '{meeting_code}'"
                )));
            }
        }

        let mut message = ChatMessage::new(
            scope,
            sender.user_id.clone(),
            receiver.clone(),
            text,
            translations,
        );
        self.store.persist(&message).await?;

        let delivered = match &receiver {
            Some(to) => {
                let event = ServerEvent::ChatMessage {
                    message: message.clone(),
                };
                match self.presence.resolve(to) {
                    Some(conn) => conn.send(event),
                    None => {
                        tracing::debug!(message_id = %message.id, to = %to, "Receiver offline, chat stays undelivered");
                        false
                    }
                }
            }
            None => match &message.scope {
                ChatScope::Meeting(meeting_code) => {
                    let others: Vec<Identity> = self
                        .rooms
                        .active_identities(meeting_code)?
                        .into_iter()
                        .filter(|i| i.user_id != sender.user_id)
                        .collect();
                    let event = ServerEvent::ChatMessage {
                        message: message.clone(),
                    };
                    let mut any = false;
                    for identity in &others {
                        if let Some(conn) = self.presence.resolve(&identity.user_id) {
                            any |= conn.send(event.clone());
                        }
                    }
                    any
                }
                ChatScope::Call(_) => {
                    return Err(AppError::validation(
                        "Call-scoped chat requires a receiver",
                    ))
                }
            },
        };

        if delivered {
            self.store.mark_delivered(message.id).await?;
            message.mark_delivered();
        }

        Ok(message)
    }

    /// Mark a message read on behalf of `reader`.
    ///
    /// Only the message's receiver may do this; anyone else gets an
    /// authorization error and no state changes. Re-reading an
    /// already-read message is a quiet no-op.
    pub async fn mark_read(&self, reader: &UserId, message_id: MessageId) -> AppResult<()> {
        let message = self
            .store
            .fetch(message_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Message '{message_id}' not found")))?;

        if message.receiver.as_ref() != Some(reader) {
            return Err(AppError::authorization(
                "Only the message receiver may mark it read",
            ));
        }

        let flipped = self.store.mark_read(message_id, Utc::now()).await?;
        if !flipped {
            tracing::debug!(message_id = %message_id, "Message already read");
        }
        Ok(())
    }

    /// Broadcast a live subtitle to a meeting and append it to the
    /// meeting's subtitle log. Never targeted at a single receiver.
    pub async fn send_subtitle(
        &self,
        speaker: &UserId,
        meeting_code: &MeetingCode,
        text: String,
        language: String,
        confidence: f32,
        translations: Vec<Translation>,
    ) -> AppResult<()> {
        let identities = self.rooms.active_identities(meeting_code)?;
        if !identities.iter().any(|i| i.user_id == *speaker) {
            return Err(AppError::validation(format!(
                "'{speaker}' is not in meeting '{meeting_code}'"
            )));
        }
        let others: Vec<Identity> = identities
            .into_iter()
            .filter(|i| i.user_id != *speaker)
            .collect();

        let subtitle = Subtitle::new(
            meeting_code.clone(),
            speaker.clone(),
            text,
            language,
            confidence,
            translations,
        );
        self.store.append_subtitle(&subtitle).await?;

        let event = ServerEvent::Subtitle { subtitle };
        for identity in &others {
            if let Some(conn) = self.presence.resolve(&identity.user_id) {
                conn.send(event.clone());
            }
        }
        Ok(())
    }

    /// Forward an ephemeral typing indicator. Never persisted; silently
    /// dropped when the destination is unresolvable.
    pub fn typing(
        &self,
        from: &UserId,
        scope: ChatScope,
        receiver: Option<UserId>,
        started: bool,
    ) {
        let event = if started {
            ServerEvent::TypingStart {
                scope: scope.clone(),
                from: from.clone(),
            }
        } else {
            ServerEvent::TypingStop {
                scope: scope.clone(),
                from: from.clone(),
            }
        };

        match (receiver, &scope) {
            (Some(to), _) => {
                if let Some(conn) = self.presence.resolve(&to) {
                    conn.send(event);
                }
            }
            (None, ChatScope::Meeting(meeting_code)) => {
                if let Ok(identities) = self.rooms.active_identities(meeting_code) {
                    for identity in identities.iter().filter(|i| i.user_id != *from) {
                        if let Some(conn) = self.presence.resolve(&identity.user_id) {
                            conn.send(event.clone());
                        }
                    }
                }
            }
            (None, ChatScope::Call(_)) => {}
        }
    }
}
