/**
 * Broadcast Worker
 *
 * Drains the hub's shared inbound queue and copies every payload to every
 * live connection. Runs as one spawned task for the life of the server and
 * stops when its cancellation token fires.
 */

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::hub::Hub;

/// Spawn the worker draining `queue` into [`Hub::broadcast`].
///
/// The worker exits when `shutdown` is cancelled or every sender of `queue`
/// is gone. Payloads still queued at cancellation are dropped.
///
/// # Example
///
/// ```rust,no_run
/// use cmshub::backend::hub::{spawn_broadcast_worker, Hub};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let (hub, queue) = Hub::new(64, 256);
/// let shutdown = CancellationToken::new();
/// let worker = spawn_broadcast_worker(hub.clone(), queue, shutdown.clone());
///
/// shutdown.cancel();
/// worker.await.ok();
/// # }
/// ```
pub fn spawn_broadcast_worker(
    hub: Hub,
    mut queue: mpsc::Receiver<Bytes>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Broadcast worker started");
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::debug!("Broadcast worker shutting down");
                    break;
                }
                payload = queue.recv() => match payload {
                    Some(payload) => {
                        let delivered = hub.broadcast(payload).await;
                        tracing::trace!(delivered, "Broadcast payload delivered");
                    }
                    None => {
                        tracing::debug!("Broadcast queue closed");
                        break;
                    }
                },
            }
        }
        tracing::info!("Broadcast worker stopped");
    })
}
