/**
 * Per-Connection Pumps
 *
 * Two loops run for every session:
 *
 * - the **inbound pump** reads frames from the transport one at a time and
 *   forwards data frames to the hub's broadcast queue;
 * - the **outbound pump** drains the connection's queue and writes each
 *   payload to the transport, pinging the peer on a fixed interval.
 *
 * The heartbeat keeps quiet sessions alive: every ping is answered with a
 * pong, which the inbound pump counts as activity. A session is only closed
 * as idle once a ping has gone unanswered for the pong timeout.
 *
 * Both are generic over `Stream`/`Sink` so the WebSocket handler and the
 * tests can drive them with different transports. Each returns a
 * [`PumpExit`] saying why it stopped; the caller tears the session down when
 * the first one returns.
 */

use std::fmt::Display;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{pin_mut, Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::shared::config::HubConfig;

/// A frame read from the transport, stripped of transport detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// Text or binary payload
    Data(Bytes),
    /// Ping/pong; only counts as activity
    Control,
    /// The peer asked to close
    Close,
}

/// A frame handed to the transport by the outbound pump
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Data(Bytes),
    Ping,
}

/// Ping cadence and the inbound silence allowed before a session is dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Heartbeat {
    pub ping_interval: Option<Duration>,
    pub idle_timeout: Option<Duration>,
}

impl From<&HubConfig> for Heartbeat {
    fn from(config: &HubConfig) -> Self {
        Self {
            ping_interval: config.ping_interval(),
            idle_timeout: config.idle_timeout(),
        }
    }
}

/// Why a pump stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// Peer sent a close frame
    PeerClosed,
    /// Transport stream ended
    EndOfStream,
    /// Transport read failed
    ReadError,
    /// No inbound frame within the idle timeout
    IdleTimeout,
    /// The broadcast queue is gone (server shutting down)
    BroadcastClosed,
    /// The connection's queue was closed by the registry
    QueueClosed,
    /// Transport write failed
    WriteError,
    /// The server is shutting down
    Shutdown,
}

/// Forward data frames from `frames` into `broadcast`.
///
/// Control frames are skipped. A close frame, a read error, the end of the
/// stream, or `idle_timeout` elapsing between two frames ends the loop.
pub async fn inbound_pump<S, E>(
    frames: S,
    broadcast: mpsc::Sender<Bytes>,
    idle_timeout: Option<Duration>,
) -> PumpExit
where
    S: Stream<Item = Result<InboundFrame, E>>,
    E: Display,
{
    pin_mut!(frames);

    loop {
        let next = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, frames.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::debug!(?limit, "Inbound idle timeout");
                    return PumpExit::IdleTimeout;
                }
            },
            None => frames.next().await,
        };

        match next {
            Some(Ok(InboundFrame::Data(payload))) => {
                if broadcast.send(payload).await.is_err() {
                    return PumpExit::BroadcastClosed;
                }
            }
            Some(Ok(InboundFrame::Control)) => {}
            Some(Ok(InboundFrame::Close)) => return PumpExit::PeerClosed,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "Inbound read failed");
                return PumpExit::ReadError;
            }
            None => return PumpExit::EndOfStream,
        }
    }
}

/// Write every payload of `queue` to `sink` in order, with a
/// [`OutboundFrame::Ping`] every `ping_interval`.
///
/// Ends when the queue is closed (the registry dropped the connection) or a
/// write fails. The sink is closed on a clean exit.
pub async fn outbound_pump<K>(
    mut queue: mpsc::Receiver<Bytes>,
    sink: K,
    ping_interval: Option<Duration>,
) -> PumpExit
where
    K: Sink<OutboundFrame>,
    K::Error: Display,
{
    pin_mut!(sink);

    // The first ping goes out one full interval after the session starts
    let mut ticker = ping_interval.map(|period| {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    loop {
        let frame = tokio::select! {
            payload = queue.recv() => match payload {
                Some(payload) => OutboundFrame::Data(payload),
                None => break,
            },
            _ = next_tick(&mut ticker) => OutboundFrame::Ping,
        };

        if let Err(e) = sink.send(frame).await {
            tracing::debug!(error = %e, "Outbound write failed");
            return PumpExit::WriteError;
        }
    }

    if let Err(e) = sink.close().await {
        tracing::debug!(error = %e, "Closing transport failed");
    }
    PumpExit::QueueClosed
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use tokio_util::sync::PollSender;

    #[tokio::test]
    async fn test_inbound_forwards_data_and_stops_on_close() {
        let (tx, mut rx) = mpsc::channel(8);
        let frames = stream::iter(vec![
            Ok::<_, String>(InboundFrame::Data(Bytes::from_static(b"a"))),
            Ok(InboundFrame::Control),
            Ok(InboundFrame::Close),
            Ok(InboundFrame::Data(Bytes::from_static(b"never"))),
        ]);

        assert_eq!(inbound_pump(frames, tx, None).await, PumpExit::PeerClosed);
        assert_eq!(rx.recv().await.as_deref(), Some(&b"a"[..]));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_inbound_read_error() {
        let (tx, _rx) = mpsc::channel(1);
        let frames = stream::iter(vec![Err::<InboundFrame, _>("reset".to_string())]);
        assert_eq!(inbound_pump(frames, tx, None).await, PumpExit::ReadError);
    }

    #[tokio::test]
    async fn test_inbound_idle_timeout() {
        let (tx, _rx) = mpsc::channel(1);
        let frames = stream::pending::<Result<InboundFrame, String>>();
        let exit = inbound_pump(frames, tx, Some(Duration::from_millis(20))).await;
        assert_eq!(exit, PumpExit::IdleTimeout);
    }

    #[tokio::test]
    async fn test_outbound_writes_in_order_until_queue_closes() {
        let (queue_tx, queue_rx) = mpsc::channel(4);
        let (sink_tx, mut sink_rx) = mpsc::channel::<OutboundFrame>(4);

        queue_tx.send(Bytes::from_static(b"1")).await.unwrap();
        queue_tx.send(Bytes::from_static(b"2")).await.unwrap();
        drop(queue_tx);

        let exit = outbound_pump(queue_rx, PollSender::new(sink_tx), None).await;
        assert_eq!(exit, PumpExit::QueueClosed);
        assert_eq!(sink_rx.recv().await, Some(OutboundFrame::Data(Bytes::from_static(b"1"))));
        assert_eq!(sink_rx.recv().await, Some(OutboundFrame::Data(Bytes::from_static(b"2"))));
        assert!(sink_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_outbound_write_error() {
        let (queue_tx, queue_rx) = mpsc::channel(4);
        let (sink_tx, sink_rx) = mpsc::channel::<OutboundFrame>(1);
        drop(sink_rx);

        queue_tx.send(Bytes::from_static(b"lost")).await.unwrap();
        let exit = outbound_pump(queue_rx, PollSender::new(sink_tx), None).await;
        assert_eq!(exit, PumpExit::WriteError);
    }

    #[tokio::test]
    async fn test_outbound_pings_while_queue_is_quiet() {
        let (queue_tx, queue_rx) = mpsc::channel::<Bytes>(4);
        let (sink_tx, mut sink_rx) = mpsc::channel::<OutboundFrame>(8);
        let pump = tokio::spawn(outbound_pump(
            queue_rx,
            PollSender::new(sink_tx),
            Some(Duration::from_millis(20)),
        ));

        for _ in 0..2 {
            let frame = tokio::time::timeout(Duration::from_secs(1), sink_rx.recv())
                .await
                .unwrap();
            assert_eq!(frame, Some(OutboundFrame::Ping));
        }

        drop(queue_tx);
        assert_eq!(pump.await.unwrap(), PumpExit::QueueClosed);
    }

    #[test]
    fn test_heartbeat_from_config() {
        let heartbeat = Heartbeat::from(&HubConfig::default());
        assert_eq!(heartbeat.ping_interval, Some(Duration::from_secs(30)));
        assert_eq!(heartbeat.idle_timeout, Some(Duration::from_secs(40)));

        let disabled = HubConfig {
            ping_interval_secs: 0,
            ..HubConfig::default()
        };
        assert_eq!(Heartbeat::from(&disabled), Heartbeat::default());
    }
}
