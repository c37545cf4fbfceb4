//! One live session, independent of the transport carrying it.
//!
//! Registers the connection, runs both pumps until the first one stops (or
//! the server shuts down) and unregisters it again.

use std::fmt::Display;

use futures_util::{Sink, Stream};
use tokio_util::sync::CancellationToken;

use super::pump::{inbound_pump, outbound_pump, Heartbeat, InboundFrame, OutboundFrame, PumpExit};
use super::registry::Hub;
use crate::shared::chat::UserId;

pub async fn drive_session<S, E, K>(
    hub: &Hub,
    identity: UserId,
    frames: S,
    sink: K,
    heartbeat: Heartbeat,
    shutdown: &CancellationToken,
) -> PumpExit
where
    S: Stream<Item = Result<InboundFrame, E>>,
    E: Display,
    K: Sink<OutboundFrame>,
    K::Error: Display,
{
    let (handle, queue) = hub.register(identity).await;

    let exit = tokio::select! {
        exit = inbound_pump(frames, hub.broadcast_sender(), heartbeat.idle_timeout) => exit,
        exit = outbound_pump(queue, sink, heartbeat.ping_interval) => exit,
        _ = shutdown.cancelled() => PumpExit::Shutdown,
    };

    hub.unregister(handle.id).await;
    tracing::info!(
        connection_id = handle.id,
        identity,
        reason = ?exit,
        "Session ended"
    );
    exit
}
