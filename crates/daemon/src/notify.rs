//! Live-channel registry and fanout
//!
//! Tracks at most one live connection per identity and pushes
//! [`ChangeEvent`] hints to them. Hints are best effort: each connection has
//! a small bounded buffer and anything that does not fit, or targets an
//! identity that is not connected, is dropped. Clients reconcile by
//! re-fetching on reconnect.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use common::types::{ChangeEvent, IdentityId};

/// Default per-connection buffer of undelivered hints
pub const DEFAULT_LIVE_BUFFER: usize = 32;

/// Identifies one registration, so a replaced connection cannot
/// deregister its successor
pub type ConnectionId = u64;

/// Handed to a live connection on registration
#[derive(Debug)]
pub struct Subscription {
    pub connection_id: ConnectionId,
    pub events: mpsc::Receiver<ChangeEvent>,
}

struct Registration {
    connection_id: ConnectionId,
    tx: mpsc::Sender<ChangeEvent>,
}

/// Registry of live connections
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct NotificationHub {
    connections: Arc<RwLock<HashMap<IdentityId, Registration>>>,
    next_id: Arc<AtomicU64>,
    buffer: usize,
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationHub")
            .field("connected", &self.connected_count())
            .field("buffer", &self.buffer)
            .finish()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_LIVE_BUFFER)
    }
}

impl NotificationHub {
    pub fn new(buffer: usize) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            buffer: buffer.max(1),
        }
    }

    /// Bind a new live connection to `identity`, replacing any prior one
    ///
    /// The replaced connection's receiver closes once its sender is dropped
    /// here.
    pub fn register(&self, identity: IdentityId) -> Subscription {
        let connection_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, events) = mpsc::channel(self.buffer);

        let replaced = self
            .connections
            .write()
            .insert(identity, Registration { connection_id, tx });

        match replaced {
            Some(prior) => tracing::info!(
                identity,
                connection_id,
                replaced = prior.connection_id,
                "live connection replaced"
            ),
            None => tracing::info!(identity, connection_id, "live connection registered"),
        }

        Subscription {
            connection_id,
            events,
        }
    }

    /// Remove `identity`'s registration if it is still `connection_id`
    ///
    /// Returns whether anything was removed.
    pub fn deregister(&self, identity: IdentityId, connection_id: ConnectionId) -> bool {
        let mut connections = self.connections.write();
        match connections.get(&identity) {
            Some(current) if current.connection_id == connection_id => {
                connections.remove(&identity);
                tracing::info!(identity, connection_id, "live connection closed");
                true
            }
            _ => false,
        }
    }

    pub fn is_connected(&self, identity: IdentityId) -> bool {
        self.connections.read().contains_key(&identity)
    }

    pub fn connected_count(&self) -> usize {
        self.connections.read().len()
    }

    /// Push `event` to every connected member of `audience`
    ///
    /// Never fails. Returns how many connections accepted the hint.
    pub fn publish(&self, audience: &[IdentityId], event: ChangeEvent) -> usize {
        let connections = self.connections.read();
        let mut delivered = 0;

        for identity in audience {
            let Some(registration) = connections.get(identity) else {
                continue;
            };
            match registration.tx.try_send(event) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::debug!(identity, error = %e, "dropped live hint"),
            }
        }

        tracing::debug!(
            kind = ?event.kind,
            owner = event.owner_id,
            audience = audience.len(),
            delivered,
            "published change"
        );
        delivered
    }
}

#[cfg(test)]
mod tests {
    use common::types::ChangeKind;

    use super::*;

    fn event(owner: IdentityId) -> ChangeEvent {
        ChangeEvent {
            kind: ChangeKind::TileChanged,
            owner_id: owner,
            x: 0,
            y: 0,
            actor_id: owner,
        }
    }

    #[tokio::test]
    async fn test_only_registered_audience_receives() {
        let hub = NotificationHub::new(4);
        let mut alice = hub.register(1);
        let mut carol = hub.register(3);

        assert_eq!(hub.publish(&[1, 2], event(1)), 1);
        assert_eq!(alice.events.recv().await, Some(event(1)));
        assert!(carol.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_new_registration_replaces_prior() {
        let hub = NotificationHub::new(4);
        let mut first = hub.register(1);
        let mut second = hub.register(1);
        assert_eq!(hub.connected_count(), 1);

        // The first receiver's sender is gone
        assert_eq!(first.events.recv().await, None);

        hub.publish(&[1], event(1));
        assert_eq!(second.events.recv().await, Some(event(1)));

        // A stale close does not evict the live connection
        assert!(!hub.deregister(1, first.connection_id));
        assert!(hub.is_connected(1));
        assert!(hub.deregister(1, second.connection_id));
        assert!(!hub.is_connected(1));
    }

    #[tokio::test]
    async fn test_full_buffer_drops_hints() {
        let hub = NotificationHub::new(1);
        let mut slow = hub.register(1);

        assert_eq!(hub.publish(&[1], event(1)), 1);
        assert_eq!(hub.publish(&[1], event(1)), 0);
        assert!(slow.events.recv().await.is_some());
        assert!(slow.events.try_recv().is_err());
    }
}
