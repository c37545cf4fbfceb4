/**
 * WebSocket Handler
 *
 * Authenticates the upgrade request, then drives one session:
 *
 * the socket is split, its messages are mapped to pump frames and the
 * halves are handed to [`drive_session`], which registers the connection
 * under the token's user id and unregisters it once either pump stops or the
 * server shuts down. Heartbeat pings go out as `Message::Ping`; the browser
 * answers them on its own.
 *
 * Browsers cannot set headers on a WebSocket request, so the token may come
 * from the `token` query parameter as well as from `Authorization`.
 */

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use bytes::Bytes;
use futures_util::{future, SinkExt, StreamExt};
use serde::Deserialize;

use crate::backend::auth::sessions::verify_token;
use crate::backend::error::BackendError;
use crate::backend::hub::{drive_session, Heartbeat, InboundFrame, OutboundFrame};
use crate::backend::middleware::{bearer_token, ApiQuery};
use crate::backend::server::state::AppState;
use crate::shared::chat::UserId;

/// Query parameters of `GET /ws`
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// GET /ws?token=JWT
pub async fn ws_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, BackendError> {
    let token = query
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| BackendError::unauthorized("missing token"))?;

    let claims = verify_token(&state.jwt_secret, token).map_err(|e| {
        tracing::warn!(error = %e, "WebSocket auth failed");
        BackendError::unauthorized("invalid token")
    })?;
    let identity = claims.user_id()?;

    tracing::debug!(identity, "WebSocket connection authenticated");
    Ok(ws.on_upgrade(move |socket| run_session(socket, state, identity)))
}

/// Map a transport message to a pump frame
pub fn inbound_frame(message: Message) -> InboundFrame {
    match message {
        Message::Text(text) => InboundFrame::Data(Bytes::copy_from_slice(text.as_str().as_bytes())),
        Message::Binary(data) => InboundFrame::Data(data),
        Message::Ping(_) | Message::Pong(_) => InboundFrame::Control,
        Message::Close(_) => InboundFrame::Close,
    }
}

/// Payloads that are valid UTF-8 go out as text frames, the rest as binary
pub fn outbound_message(frame: OutboundFrame) -> Message {
    match frame {
        OutboundFrame::Data(payload) => match std::str::from_utf8(&payload) {
            Ok(text) => Message::Text(text.to_owned().into()),
            Err(_) => Message::Binary(payload),
        },
        OutboundFrame::Ping => Message::Ping(Bytes::new()),
    }
}

async fn run_session(socket: WebSocket, state: AppState, identity: UserId) {
    let (sink, stream) = socket.split();
    let frames = stream.map(|message| message.map(inbound_frame));
    let sink = sink.with(|frame: OutboundFrame| future::ready(Ok::<_, axum::Error>(outbound_message(frame))));

    drive_session(
        &state.hub,
        identity,
        frames,
        sink,
        Heartbeat::from(&state.hub_config),
        &state.shutdown,
    )
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_frame_mapping() {
        assert_eq!(
            inbound_frame(Message::Text("hi".into())),
            InboundFrame::Data(Bytes::from_static(b"hi"))
        );
        assert_eq!(
            inbound_frame(Message::Binary(Bytes::from_static(&[0, 1]))),
            InboundFrame::Data(Bytes::from_static(&[0, 1]))
        );
        assert_eq!(inbound_frame(Message::Ping(Bytes::new())), InboundFrame::Control);
        assert_eq!(inbound_frame(Message::Close(None)), InboundFrame::Close);
    }

    #[test]
    fn test_outbound_message_picks_frame_type() {
        let text = OutboundFrame::Data(Bytes::from_static(b"{}"));
        let binary = OutboundFrame::Data(Bytes::from_static(&[0xff, 0xfe]));
        assert!(matches!(outbound_message(text), Message::Text(_)));
        assert!(matches!(outbound_message(binary), Message::Binary(_)));
        assert!(matches!(outbound_message(OutboundFrame::Ping), Message::Ping(_)));
    }
}
