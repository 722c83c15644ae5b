//! Top-level real-time engine.
//!
//! Owns every shared table (connection pool, presence registry, active
//! calls, live meetings) and dispatches each decoded client event to
//! exactly one handler. Failures are surfaced as typed `error` events to
//! the originating connection only; nothing a client sends can take down
//! another client's session or the process.

use std::sync::Arc;

use tokio::sync::mpsc;

use carehub_core::config::realtime::RealtimeConfig;
use carehub_core::AppError;
use carehub_entity::identity::Identity;
use carehub_entity::meeting::RecordingStatus;
use carehub_store::{ChatMessageStore, MeetingStore};

use crate::call::coordinator::CallCoordinator;
use crate::chat::relay::ChatRelay;
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::message::types::{ClientEvent, MeetingNotice, ServerEvent};
use crate::presence::registry::PresenceRegistry;
use crate::room::coordinator::RoomCoordinator;
use crate::signaling::relay::SignalingRelay;

/// Central coordinator of all real-time subsystems.
///
/// Explicitly constructed and passed by reference — never an ambient
/// global — so tests can run isolated engines side by side.
#[derive(Debug, Clone)]
pub struct RealtimeEngine {
    /// Connection pool.
    pub pool: Arc<ConnectionPool>,
    /// Presence registry.
    pub presence: Arc<PresenceRegistry>,
    /// Call session coordinator.
    pub calls: Arc<CallCoordinator>,
    /// Signaling relay.
    pub signaling: Arc<SignalingRelay>,
    /// Room coordinator.
    pub rooms: Arc<RoomCoordinator>,
    /// Chat & subtitle relay.
    pub chat: Arc<ChatRelay>,
    config: RealtimeConfig,
}

impl RealtimeEngine {
    /// Wire up all subsystems.
    pub fn new(
        config: RealtimeConfig,
        chat_store: Arc<dyn ChatMessageStore>,
        meeting_store: Arc<dyn MeetingStore>,
    ) -> Self {
        let pool = Arc::new(ConnectionPool::new());
        let presence = Arc::new(PresenceRegistry::new(pool.clone()));
        let signaling = Arc::new(SignalingRelay::new(presence.clone()));
        let calls = Arc::new(CallCoordinator::new(
            presence.clone(),
            signaling.clone(),
            &config,
        ));
        let rooms = Arc::new(RoomCoordinator::new(
            presence.clone(),
            meeting_store,
            &config,
        ));
        let chat = Arc::new(ChatRelay::new(presence.clone(), rooms.clone(), chat_store));

        tracing::info!("Real-time engine initialized");

        Self {
            pool,
            presence,
            calls,
            signaling,
            rooms,
            chat,
            config,
        }
    }

    /// Register a new connection.
    ///
    /// `identity` is `Some` when the transport authenticated the client
    /// (token at upgrade); anonymous connections announce themselves
    /// with a `join` event instead. Returns the handle plus the receiver
    /// end of the connection's outbound queue.
    pub fn connect(
        &self,
        identity: Option<Identity>,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(tx));
        self.pool.add(handle.clone());

        if let Some(identity) = identity {
            self.bind_identity(&handle, identity, true);
        }

        tracing::info!(conn_id = %handle.id, "Connection registered");
        (handle, rx)
    }

    /// Process one decoded client event.
    pub async fn handle_event(&self, conn: &Arc<ConnectionHandle>, event: ClientEvent) {
        if let Err(e) = self.dispatch(conn, event).await {
            conn.send(ServerEvent::Error {
                code: e.kind.to_string(),
                message: e.message,
            });
        }
    }

    /// Transport-level disconnect: remove the presence entry and let the
    /// coordinators treat it as an implicit terminate/leave.
    pub async fn disconnect(&self, conn_id: &ConnectionId) {
        let handle = match self.pool.remove(conn_id) {
            Some(h) => h,
            None => return,
        };
        handle.mark_closed();

        if let Some(identity) = handle.identity() {
            // Only the connection that still owns the presence entry
            // triggers teardown; a superseded tab closing must not end
            // the fresh connection's calls.
            if self.presence.remove(&identity.user_id, *conn_id) {
                self.calls.handle_disconnect(&identity.user_id);
                self.rooms.handle_disconnect(&identity.user_id).await;
                tracing::info!(
                    conn_id = %conn_id,
                    user_id = %identity.user_id,
                    "Connection closed, sessions cleaned up"
                );
                return;
            }
        }
        tracing::info!(conn_id = %conn_id, "Connection closed");
    }

    fn bind_identity(&self, conn: &Arc<ConnectionHandle>, identity: Identity, token_bound: bool) {
        conn.bind(identity.clone(), token_bound);
        if let Some(superseded) = self.presence.join(identity.clone(), conn.id) {
            superseded.send(ServerEvent::Superseded);
        }
        conn.send(ServerEvent::Joined { identity });
    }

    async fn dispatch(
        &self,
        conn: &Arc<ConnectionHandle>,
        event: ClientEvent,
    ) -> Result<(), AppError> {
        // `join` is the only event an anonymous connection may send.
        let event = match event {
            ClientEvent::Join { identity } => {
                if conn.is_token_bound() {
                    let bound = conn.identity();
                    if bound.map(|b| b.user_id) != Some(identity.user_id.clone()) {
                        return Err(AppError::validation(
                            "Connection identity is fixed by the upgrade token",
                        ));
                    }
                }
                self.bind_identity(conn, identity, false);
                return Ok(());
            }
            other => other,
        };

        let identity = conn
            .identity()
            .ok_or_else(|| AppError::authentication("Announce an identity with `join` first"))?;

        match event {
            ClientEvent::Join { .. } => unreachable!("handled above"),
            ClientEvent::CallUser { call_id, receiver } => {
                self.calls.initiate(&identity, call_id, &receiver);
                Ok(())
            }
            ClientEvent::AnswerCall { call_id, signal } => {
                self.calls.accept(&identity.user_id, &call_id, signal)
            }
            ClientEvent::RejectCall { call_id } => {
                self.calls.reject(&identity.user_id, &call_id)
            }
            ClientEvent::EndCall { call_id } => {
                self.calls.terminate(&identity.user_id, &call_id);
                Ok(())
            }
            ClientEvent::Signal {
                call_id,
                kind,
                target,
                signal,
            } => {
                // Best-effort: unresolvable targets drop the payload.
                self.signaling
                    .relay(&call_id, &kind, &identity.user_id, &target, signal);
                Ok(())
            }
            ClientEvent::CreateMeeting { settings } => {
                let meeting = self.rooms.create(identity, settings).await?;
                conn.send(ServerEvent::MeetingCreated {
                    code: meeting.code,
                    settings: meeting.settings,
                });
                Ok(())
            }
            ClientEvent::JoinMeeting { code } => {
                let participants = self.rooms.join(identity, &code).await?;
                conn.send(ServerEvent::MeetingJoined { code, participants });
                Ok(())
            }
            ClientEvent::LeaveMeeting { code } => {
                self.rooms.leave(&identity.user_id, &code).await
            }
            ClientEvent::EndMeeting { code } => {
                self.rooms.end(&identity.user_id, &code).await
            }
            ClientEvent::RemoveParticipant { code, target } => {
                self.rooms
                    .remove_participant(&identity.user_id, &code, &target)
                    .await
            }
            ClientEvent::UpdateSettings { code, settings } => {
                self.rooms
                    .update_settings(&identity.user_id, &code, settings)
                    .await
            }
            ClientEvent::StartRecording { code } => {
                self.rooms
                    .set_recording(&identity.user_id, &code, RecordingStatus::Recording)
                    .await
            }
            ClientEvent::StopRecording { code } => {
                self.rooms
                    .set_recording(&identity.user_id, &code, RecordingStatus::Idle)
                    .await
            }
            ClientEvent::SendChatMessage {
                scope,
                receiver,
                text,
                translations,
            } => {
                let message = self
                    .chat
                    .send_chat(&identity, scope, receiver, text, translations)
                    .await?;
                // Echo the persisted message (with its id and flags)
                // back to the sender.
                conn.send(ServerEvent::ChatMessage { message });
                Ok(())
            }
            ClientEvent::MarkRead { message_id } => {
                self.chat.mark_read(&identity.user_id, message_id).await
            }
            ClientEvent::SendSubtitle {
                code,
                text,
                language,
                confidence,
                translations,
            } => {
                self.chat
                    .send_subtitle(
                        &identity.user_id,
                        &code,
                        text,
                        language,
                        confidence,
                        translations,
                    )
                    .await
            }
            ClientEvent::TypingStart { scope, receiver } => {
                self.chat.typing(&identity.user_id, scope, receiver, true);
                Ok(())
            }
            ClientEvent::TypingStop { scope, receiver } => {
                self.chat.typing(&identity.user_id, scope, receiver, false);
                Ok(())
            }
            ClientEvent::ScreenShare { code, active } => self.rooms.notice(
                &identity.user_id,
                &code,
                MeetingNotice::ScreenShare { active },
            ),
            ClientEvent::RaiseHand { code, raised } => self.rooms.notice(
                &identity.user_id,
                &code,
                MeetingNotice::RaiseHand { raised },
            ),
            ClientEvent::ToggleMute { code, muted } => {
                self.rooms
                    .notice(&identity.user_id, &code, MeetingNotice::Mute { muted })
            }
            ClientEvent::ToggleCamera { code, enabled } => self.rooms.notice(
                &identity.user_id,
                &code,
                MeetingNotice::Camera { enabled },
            ),
            ClientEvent::VirtualBackground { code, background } => self.rooms.notice(
                &identity.user_id,
                &code,
                MeetingNotice::VirtualBackground { background },
            ),
        }
    }
}
