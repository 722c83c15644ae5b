//! Call session coordinator.
//!
//! One state machine per call: `Ringing → Connected → Ended`, with
//! `Rejected` and `Failed` as alternate terminals. Sessions live only in
//! the `sessions` map; reaching a terminal state removes the entry, so
//! occupancy of a call id means the call is active.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;

use carehub_core::config::realtime::RealtimeConfig;
use carehub_core::types::id::{CallId, UserId};
use carehub_core::{AppError, AppResult};
use carehub_entity::call::{CallSession, CallState};
use carehub_entity::identity::Identity;

use crate::message::types::ServerEvent;
use crate::presence::registry::PresenceRegistry;
use crate::signaling::relay::SignalingRelay;

/// Reason string sent when the receiver is not in the presence registry.
pub const REASON_USER_NOT_AVAILABLE: &str = "user not available";
/// Reason string sent when a call id already has an active session.
pub const REASON_ALREADY_ACTIVE: &str = "call already active";
/// Reason string sent when a ring expires unanswered.
pub const REASON_NO_ANSWER: &str = "no answer";

/// Coordinates two-party call sessions on top of the presence registry.
#[derive(Debug)]
pub struct CallCoordinator {
    presence: Arc<PresenceRegistry>,
    relay: Arc<SignalingRelay>,
    sessions: DashMap<CallId, CallSession>,
    answer_timeout: Option<Duration>,
}

impl CallCoordinator {
    /// Creates a coordinator.
    pub fn new(
        presence: Arc<PresenceRegistry>,
        relay: Arc<SignalingRelay>,
        config: &RealtimeConfig,
    ) -> Self {
        let answer_timeout = match config.answer_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self {
            presence,
            relay,
            sessions: DashMap::new(),
            answer_timeout,
        }
    }

    /// Start a call from `caller` to `receiver_id` under `call_id`.
    ///
    /// Failures are reported to the caller as typed `call_failed` events
    /// rather than errors: an unresolvable receiver leaves no session
    /// behind, and a second initiate for an already-active call id loses
    /// (first-writer-wins).
    pub fn initiate(self: &Arc<Self>, caller: &Identity, call_id: CallId, receiver_id: &UserId) {
        let caller_conn = match self.presence.resolve(&caller.user_id) {
            Some(conn) => conn,
            None => return,
        };

        let receiver_entry = match self.presence.entry(receiver_id) {
            Some(entry) => entry,
            None => {
                caller_conn.send(ServerEvent::CallFailed {
                    call_id,
                    reason: REASON_USER_NOT_AVAILABLE.to_string(),
                });
                return;
            }
        };

        // First-writer-wins on the call id: the entry API makes the
        // check-and-insert atomic against a concurrent initiate.
        let session = CallSession::ringing(call_id.clone(), caller.clone(), receiver_entry.identity);
        match self.sessions.entry(call_id.clone()) {
            dashmap::Entry::Occupied(_) => {
                caller_conn.send(ServerEvent::CallFailed {
                    call_id,
                    reason: REASON_ALREADY_ACTIVE.to_string(),
                });
                return;
            }
            dashmap::Entry::Vacant(slot) => {
                slot.insert(session);
            }
        }

        if let Some(receiver_conn) = self.presence.resolve(receiver_id) {
            receiver_conn.send(ServerEvent::IncomingCall {
                call_id: call_id.clone(),
                caller: caller.clone(),
            });
        }

        tracing::info!(call_id = %call_id, caller = %caller.user_id, receiver = %receiver_id, "Call ringing");

        if let Some(timeout) = self.answer_timeout {
            let coordinator = Arc::clone(self);
            let expiring = call_id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                coordinator.expire(&expiring);
            });
        }
    }

    /// Expire a call that is still ringing. Accepted or already-ended
    /// calls are untouched.
    pub fn expire(&self, call_id: &CallId) {
        let removed = self
            .sessions
            .remove_if(call_id, |_, session| session.state == CallState::Ringing);

        if let Some((_, session)) = removed {
            tracing::info!(call_id = %call_id, "Ring expired unanswered");
            if let Some(conn) = self.presence.resolve(&session.caller.user_id) {
                conn.send(ServerEvent::CallFailed {
                    call_id: call_id.clone(),
                    reason: REASON_NO_ANSWER.to_string(),
                });
            }
            if let Some(conn) = self.presence.resolve(&session.receiver.user_id) {
                conn.send(ServerEvent::CallCancelled {
                    call_id: call_id.clone(),
                });
            }
        }
    }

    /// Accept a ringing call and forward the answer signal to the caller.
    pub fn accept(&self, acceptor: &UserId, call_id: &CallId, signal: Value) -> AppResult<()> {
        let (caller_id, receiver_id) = {
            let mut session = self
                .sessions
                .get_mut(call_id)
                .ok_or_else(|| AppError::not_found(format!("No active call '{call_id}'")))?;

            if session.receiver.user_id != *acceptor {
                return Err(AppError::authorization(
                    "Only the call receiver may accept",
                ));
            }
            session.accept()?;
            (session.caller.user_id.clone(), session.receiver.user_id.clone())
        };

        tracing::info!(call_id = %call_id, "Call connected");
        self.relay
            .relay(call_id, "answer", &receiver_id, &caller_id, signal);
        Ok(())
    }

    /// Decline a ringing call, notify the caller, destroy the session.
    pub fn reject(&self, rejector: &UserId, call_id: &CallId) -> AppResult<()> {
        {
            let session = self
                .sessions
                .get(call_id)
                .ok_or_else(|| AppError::not_found(format!("No active call '{call_id}'")))?;
            if session.receiver.user_id != *rejector {
                return Err(AppError::authorization(
                    "Only the call receiver may reject",
                ));
            }
            if !session.state.can_accept() {
                return Err(AppError::conflict(format!(
                    "Call '{call_id}' is no longer ringing"
                )));
            }
        }

        if let Some((_, session)) = self
            .sessions
            .remove_if(call_id, |_, s| s.receiver.user_id == *rejector)
        {
            tracing::info!(call_id = %call_id, "Call rejected");
            if let Some(conn) = self.presence.resolve(&session.caller.user_id) {
                conn.send(ServerEvent::CallRejected {
                    call_id: call_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Terminate a call from either party, in any state.
    ///
    /// Idempotent: terminating a call that no longer exists is a no-op.
    pub fn terminate(&self, by: &UserId, call_id: &CallId) {
        let removed = self
            .sessions
            .remove_if(call_id, |_, session| session.involves(by));

        if let Some((_, session)) = removed {
            tracing::info!(call_id = %call_id, by = %by, "Call terminated");
            if let Some(other) = session.counterpart_of(by) {
                if let Some(conn) = self.presence.resolve(&other.user_id) {
                    conn.send(ServerEvent::CallEnded {
                        call_id: call_id.clone(),
                    });
                }
            }
        }
    }

    /// Tear down every session a departed identity was part of,
    /// notifying each counterpart exactly once.
    pub fn handle_disconnect(&self, user_id: &UserId) {
        let affected: Vec<CallId> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().involves(user_id))
            .map(|entry| entry.key().clone())
            .collect();

        for call_id in affected {
            self.terminate(user_id, &call_id);
        }
    }

    /// The session for a call id, if one is active.
    pub fn session(&self, call_id: &CallId) -> Option<CallSession> {
        self.sessions.get(call_id).map(|s| s.value().clone())
    }

    /// Number of active sessions.
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}
