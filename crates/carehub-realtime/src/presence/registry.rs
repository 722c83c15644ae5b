//! Presence registry — maps user identities to live connections.
//!
//! Pure volatile in-memory state, one instance per engine. There is no
//! multi-process fan-out: two server processes have two disjoint
//! registries. That is a structural property of the design, not a bug.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use carehub_core::types::id::UserId;
use carehub_entity::identity::Identity;
use carehub_entity::presence::PresenceInfo;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;

/// One identity's live-connection record.
///
/// A weak back-reference only: the entry names a connection id, it does
/// not own the connection, and removing it never tears down the calls or
/// meetings the identity participates in — the coordinators do that when
/// they learn about the disconnect.
#[derive(Debug, Clone)]
pub struct PresenceEntry {
    /// Who is online.
    pub identity: Identity,
    /// Their current physical connection.
    pub connection_id: ConnectionId,
    /// When that connection announced itself.
    pub connected_at: DateTime<Utc>,
}

/// Registry of online identities.
#[derive(Debug)]
pub struct PresenceRegistry {
    pool: Arc<ConnectionPool>,
    entries: DashMap<UserId, PresenceEntry>,
}

impl PresenceRegistry {
    /// Creates a registry resolving connections through `pool`.
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self {
            pool,
            entries: DashMap::new(),
        }
    }

    /// Register an identity as online on `connection_id`.
    ///
    /// Last-connect-wins: an existing entry for the same identity is
    /// replaced. Returns the superseded connection's handle (if it was a
    /// different, still-pooled connection) so the caller can notify it.
    pub fn join(
        &self,
        identity: Identity,
        connection_id: ConnectionId,
    ) -> Option<Arc<ConnectionHandle>> {
        let user_id = identity.user_id.clone();
        let previous = self.entries.insert(
            user_id.clone(),
            PresenceEntry {
                identity,
                connection_id,
                connected_at: Utc::now(),
            },
        );

        match previous {
            Some(old) if old.connection_id != connection_id => {
                tracing::warn!(
                    user_id = %user_id,
                    old_conn = %old.connection_id,
                    new_conn = %connection_id,
                    "Presence entry superseded by a newer connection"
                );
                self.pool.get(&old.connection_id)
            }
            _ => None,
        }
    }

    /// Resolve an identity to its live connection handle.
    pub fn resolve(&self, user_id: &UserId) -> Option<Arc<ConnectionHandle>> {
        let entry = self.entries.get(user_id)?;
        self.pool.get(&entry.connection_id)
    }

    /// The registry entry for an identity, if online.
    pub fn entry(&self, user_id: &UserId) -> Option<PresenceEntry> {
        self.entries.get(user_id).map(|e| e.value().clone())
    }

    /// Remove an identity's entry, but only if it still belongs to
    /// `connection_id`. A stale tab's disconnect must not evict the
    /// entry of the connection that superseded it.
    pub fn remove(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        self.entries
            .remove_if(user_id, |_, entry| entry.connection_id == connection_id)
            .is_some()
    }

    /// Whether an identity is online.
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.entries.contains_key(user_id)
    }

    /// Number of online identities.
    pub fn online_count(&self) -> usize {
        self.entries.len()
    }

    /// Snapshot of everyone online.
    pub fn online_users(&self) -> Vec<PresenceInfo> {
        self.entries
            .iter()
            .map(|e| PresenceInfo {
                identity: e.identity.clone(),
                connected_at: e.connected_at,
            })
            .collect()
    }
}
