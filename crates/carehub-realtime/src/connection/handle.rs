//! Individual connection handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use carehub_entity::identity::Identity;

use crate::message::types::ServerEvent;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single live client connection.
///
/// Holds the sender half of the per-connection outbound queue plus the
/// identity bound to the connection. Components obtain handles through
/// the presence registry for the duration of one operation only; the
/// pool is the sole long-term owner.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Identity announced by `join` or decoded from the upgrade token.
    identity: RwLock<Option<Identity>>,
    /// Sender for outbound events.
    sender: mpsc::Sender<ServerEvent>,
    /// Whether the identity came from a verified token (and therefore
    /// cannot be changed by a later `join`).
    token_bound: AtomicBool,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new anonymous connection handle.
    pub fn new(sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity: RwLock::new(None),
            sender,
            token_bound: AtomicBool::new(false),
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// The identity bound to this connection, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.identity.read().expect("identity lock poisoned").clone()
    }

    /// Bind an identity to this connection.
    pub fn bind(&self, identity: Identity, token_bound: bool) {
        *self.identity.write().expect("identity lock poisoned") = Some(identity);
        if token_bound {
            self.token_bound.store(true, Ordering::SeqCst);
        }
    }

    /// Whether the identity was fixed by a verified upgrade token.
    pub fn is_token_bound(&self) -> bool {
        self.token_bound.load(Ordering::SeqCst)
    }

    /// Queue an outbound event for this connection.
    ///
    /// Returns `false` if the connection is gone or its buffer is full;
    /// a full buffer drops the event rather than blocking the caller.
    pub fn send(&self, event: ServerEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Whether the connection is still alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as closed.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
