//! Chat Hub
//!
//! Process-wide set of live WebSocket sessions, each tagged with the user
//! identity it authenticated as.
//!
//! # Architecture
//!
//! - **`registry`** - [`Hub`]: register/unregister/lookup, targeted send and
//!   broadcast over bounded per-connection queues
//! - **`broadcast`** - worker draining the shared inbound queue into
//!   [`Hub::broadcast`] until its cancellation token fires
//! - **`pump`** - inbound (transport to broadcast queue) and outbound
//!   (connection queue to transport, plus heartbeat pings) loops
//! - **`session`** - [`drive_session`]: register, run both pumps, unregister
//!
//! # Thread Safety
//!
//! The live set is a `BTreeMap` behind a `tokio::sync::RwLock`. Sends snapshot
//! the matching queue senders under the read lock and push outside it; any
//! connection whose queue is full or closed is then removed under the write
//! lock. Pushes never block.

pub mod registry;
pub mod broadcast;
pub mod pump;
pub mod session;

pub use registry::{ConnectionHandle, ConnectionId, Hub};
pub use broadcast::spawn_broadcast_worker;
pub use pump::{inbound_pump, outbound_pump, Heartbeat, InboundFrame, OutboundFrame, PumpExit};
pub use session::drive_session;
