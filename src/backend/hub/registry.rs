/**
 * Connection Registry
 *
 * Tracks live sessions by [`ConnectionId`]. Ids come from a monotonic counter,
 * so iterating the `BTreeMap` visits connections in registration order and
 * [`Hub::lookup`] returns the oldest live connection of an identity.
 *
 * One identity may hold any number of connections (several tabs, several
 * devices). [`Hub::send_to`] delivers to all of them.
 *
 * # Queue Ownership
 *
 * The registry holds the only sender of each outbound queue. Removing an
 * entry drops that sender, which closes the queue exactly once and lets the
 * session's outbound pump finish.
 */

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, RwLock};
use tokio::sync::mpsc::error::TrySendError;

use crate::shared::chat::UserId;

/// Identifier of a live connection, unique for the life of the process
pub type ConnectionId = u64;

struct Entry {
    identity: UserId,
    sender: mpsc::Sender<Bytes>,
}

/// Returned to the session that registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub identity: UserId,
    pub connected_at: DateTime<Utc>,
}

struct HubInner {
    connections: RwLock<BTreeMap<ConnectionId, Entry>>,
    next_id: AtomicU64,
    queue_capacity: usize,
    broadcast_tx: mpsc::Sender<Bytes>,
}

/// Cloneable handle to the connection registry
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    /// Create a hub whose connections get queues of `queue_capacity` payloads.
    ///
    /// # Returns
    ///
    /// The hub and the receiving half of its broadcast queue, which belongs to
    /// the worker started with
    /// [`spawn_broadcast_worker`](crate::backend::hub::spawn_broadcast_worker).
    pub fn new(queue_capacity: usize, broadcast_capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (broadcast_tx, broadcast_rx) = mpsc::channel(broadcast_capacity.max(1));
        let hub = Self {
            inner: Arc::new(HubInner {
                connections: RwLock::new(BTreeMap::new()),
                next_id: AtomicU64::new(1),
                queue_capacity: queue_capacity.max(1),
                broadcast_tx,
            }),
        };
        (hub, broadcast_rx)
    }

    /// Sender half of the broadcast queue, used by inbound pumps
    pub fn broadcast_sender(&self) -> mpsc::Sender<Bytes> {
        self.inner.broadcast_tx.clone()
    }

    /// Admit a connection for `identity`.
    ///
    /// # Returns
    ///
    /// The connection's handle and the receiving half of its outbound queue.
    pub async fn register(&self, identity: UserId) -> (ConnectionHandle, mpsc::Receiver<Bytes>) {
        let (sender, receiver) = mpsc::channel(self.inner.queue_capacity);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = ConnectionHandle {
            id,
            identity,
            connected_at: Utc::now(),
        };

        let total = {
            let mut connections = self.inner.connections.write().await;
            connections.insert(id, Entry { identity, sender });
            connections.len()
        };

        tracing::info!(connection_id = id, identity, total, "Connection registered");
        (handle, receiver)
    }

    /// Remove a connection. Returns `false` if it was already gone.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.inner.connections.write().await.remove(&id);
        match removed {
            Some(entry) => {
                tracing::info!(connection_id = id, identity = entry.identity, "Connection unregistered");
                true
            }
            None => false,
        }
    }

    /// Oldest live connection of `identity`
    pub async fn lookup(&self, identity: UserId) -> Option<ConnectionId> {
        self.inner
            .connections
            .read()
            .await
            .iter()
            .find(|(_, entry)| entry.identity == identity)
            .map(|(id, _)| *id)
    }

    /// Every live connection of `identity`, oldest first
    pub async fn lookup_all(&self, identity: UserId) -> Vec<ConnectionId> {
        self.inner
            .connections
            .read()
            .await
            .iter()
            .filter(|(_, entry)| entry.identity == identity)
            .map(|(id, _)| *id)
            .collect()
    }

    pub async fn is_online(&self, identity: UserId) -> bool {
        self.lookup(identity).await.is_some()
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.connections.read().await.len()
    }

    /// Push `payload` to every live connection of `identity`.
    ///
    /// # Returns
    ///
    /// How many connections accepted the payload. Zero means the identity is
    /// offline (or every one of its queues was full or closed).
    pub async fn send_to(&self, identity: UserId, payload: Bytes) -> usize {
        let targets = self.snapshot(|entry| entry.identity == identity).await;
        self.push(targets, payload).await
    }

    /// Push `payload` to every live connection
    pub async fn broadcast(&self, payload: Bytes) -> usize {
        let targets = self.snapshot(|_| true).await;
        self.push(targets, payload).await
    }

    async fn snapshot<F>(&self, filter: F) -> Vec<(ConnectionId, mpsc::Sender<Bytes>)>
    where
        F: Fn(&Entry) -> bool,
    {
        self.inner
            .connections
            .read()
            .await
            .iter()
            .filter(|(_, entry)| filter(entry))
            .map(|(id, entry)| (*id, entry.sender.clone()))
            .collect()
    }

    async fn push(&self, targets: Vec<(ConnectionId, mpsc::Sender<Bytes>)>, payload: Bytes) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        for (id, sender) in targets {
            match sender.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(connection_id = id, "Outbound queue full, dropping connection");
                    dead.push(id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(connection_id = id, "Outbound queue closed, dropping connection");
                    dead.push(id);
                }
            }
        }

        if !dead.is_empty() {
            let mut connections = self.inner.connections.write().await;
            for id in dead {
                connections.remove(&id);
            }
        }

        delivered
    }
}
