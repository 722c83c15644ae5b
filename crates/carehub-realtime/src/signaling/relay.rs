//! Store-nothing forwarder for opaque negotiation payloads.

use std::sync::Arc;

use serde_json::Value;

use carehub_core::types::id::{CallId, UserId};

use crate::message::types::ServerEvent;
use crate::presence::registry::PresenceRegistry;

/// Relays offer/answer/ICE payloads between identities.
///
/// The relay holds no per-call state and never inspects the payload:
/// `kind` and `signal` are carried verbatim. If the destination cannot
/// be resolved the payload is dropped — senders get no delivery
/// confirmation and must not assume one.
#[derive(Debug)]
pub struct SignalingRelay {
    presence: Arc<PresenceRegistry>,
}

impl SignalingRelay {
    /// Creates a relay resolving destinations through `presence`.
    pub fn new(presence: Arc<PresenceRegistry>) -> Self {
        Self { presence }
    }

    /// Forward a negotiation payload. Returns whether a live connection
    /// accepted it.
    pub fn relay(
        &self,
        call_id: &CallId,
        kind: &str,
        from: &UserId,
        to: &UserId,
        signal: Value,
    ) -> bool {
        match self.presence.resolve(to) {
            Some(conn) => conn.send(ServerEvent::Signal {
                call_id: call_id.clone(),
                kind: kind.to_string(),
                from: from.clone(),
                signal,
            }),
            None => {
                tracing::debug!(
                    call_id = %call_id,
                    to = %to,
                    kind = %kind,
                    "Dropping signal for unresolvable identity"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::handle::ConnectionHandle;
    use crate::connection::pool::ConnectionPool;
    use carehub_entity::identity::{Identity, UserRole};
    use serde_json::json;
    use tokio::sync::mpsc;

    #[test]
    fn test_relay_forwards_verbatim() {
        let pool = Arc::new(ConnectionPool::new());
        let presence = Arc::new(PresenceRegistry::new(pool.clone()));
        let relay = SignalingRelay::new(presence.clone());

        let (tx, mut rx) = mpsc::channel(8);
        let conn = Arc::new(ConnectionHandle::new(tx));
        pool.add(conn.clone());
        presence.join(
            Identity::new("pt-b", UserRole::Patient, "Pat B"),
            conn.id,
        );

        let payload = json!({"sdp": "v=0...", "type": "offer"});
        let delivered = relay.relay(
            &CallId::new("appt-1"),
            "offer",
            &UserId::new("dr-a"),
            &UserId::new("pt-b"),
            payload.clone(),
        );
        assert!(delivered);

        match rx.try_recv().unwrap() {
            ServerEvent::Signal { kind, from, signal, .. } => {
                assert_eq!(kind, "offer");
                assert_eq!(from.as_str(), "dr-a");
                assert_eq!(signal, payload);
            }
            other => panic!("wrong event: {other:?}"),
        }
    }

    #[test]
    fn test_relay_to_offline_drops_silently() {
        let pool = Arc::new(ConnectionPool::new());
        let presence = Arc::new(PresenceRegistry::new(pool));
        let relay = SignalingRelay::new(presence);

        let delivered = relay.relay(
            &CallId::new("appt-1"),
            "ice-candidate",
            &UserId::new("dr-a"),
            &UserId::new("gone"),
            serde_json::json!({}),
        );
        assert!(!delivered);
    }
}
