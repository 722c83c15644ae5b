//! Call session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carehub_core::types::id::{CallId, UserId};
use carehub_core::{AppError, AppResult};

use crate::identity::Identity;

use super::state::CallState;

/// A two-party call bound to an external appointment/conversation id.
///
/// Created when a caller initiates, destroyed when the call ends, is
/// rejected, or either party disconnects. At most one active session
/// exists per [`CallId`] at any time; the coordinator enforces that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSession {
    /// External appointment/conversation id this call is bound to.
    pub call_id: CallId,
    /// The initiating party.
    pub caller: Identity,
    /// The receiving party.
    pub receiver: Identity,
    /// Current lifecycle state.
    pub state: CallState,
    /// When the caller initiated.
    pub started_at: DateTime<Utc>,
    /// When the receiver accepted, if the call connected.
    pub connected_at: Option<DateTime<Utc>>,
}

impl CallSession {
    /// Create a new ringing session.
    pub fn ringing(call_id: CallId, caller: Identity, receiver: Identity) -> Self {
        Self {
            call_id,
            caller,
            receiver,
            state: CallState::Ringing,
            started_at: Utc::now(),
            connected_at: None,
        }
    }

    /// Transition `Ringing → Connected`.
    pub fn accept(&mut self) -> AppResult<()> {
        if !self.state.can_accept() {
            return Err(AppError::conflict(format!(
                "Call '{}' cannot be accepted in state '{}'",
                self.call_id, self.state
            )));
        }
        self.state = CallState::Connected;
        self.connected_at = Some(Utc::now());
        Ok(())
    }

    /// Transition `Ringing → Rejected`.
    pub fn reject(&mut self) -> AppResult<()> {
        if !self.state.can_accept() {
            return Err(AppError::conflict(format!(
                "Call '{}' cannot be rejected in state '{}'",
                self.call_id, self.state
            )));
        }
        self.state = CallState::Rejected;
        Ok(())
    }

    /// Whether the given user is the caller or the receiver.
    pub fn involves(&self, user_id: &UserId) -> bool {
        self.caller.user_id == *user_id || self.receiver.user_id == *user_id
    }

    /// The other party relative to `user_id`, if `user_id` is a party.
    pub fn counterpart_of(&self, user_id: &UserId) -> Option<&Identity> {
        if self.caller.user_id == *user_id {
            Some(&self.receiver)
        } else if self.receiver.user_id == *user_id {
            Some(&self.caller)
        } else {
            None
        }
    }
}
