/**
 * Chat Event Frames
 *
 * Events pushed to live WebSocket sessions. Every frame is a JSON object with
 * an `action` discriminator and a `property` payload describing the message
 * the event is about:
 *
 * ```json
 * {"action":"new_message","property":{"chat_id":4,"chat_type":"private",...}}
 * ```
 *
 * The same frame is used for every recipient of a fan-out, so it is encoded
 * once with [`ChatEvent::to_bytes`] and the bytes are cloned per connection.
 */
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::shared::chat::{Chat, ChatType, Message, UserId};
use crate::shared::error::SharedError;

/// What happened to the message carried by the event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    NewMessage,
    UpdateMessage,
    DeleteMessage,
}

/// Payload of a chat event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageProperty {
    pub chat_id: i64,
    pub chat_type: ChatType,
    pub message_id: i64,
    pub message: String,
    pub message_type: String,
    pub sender: UserId,
    pub receiver: i64,
    pub send_time: String,
}

/// A frame delivered to chat clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatEvent {
    pub action: EventAction,
    pub property: MessageProperty,
}

impl ChatEvent {
    /// Build an event for `message` posted in `chat`
    pub fn new(action: EventAction, chat: &Chat, message: &Message) -> Self {
        Self {
            action,
            property: MessageProperty {
                chat_id: chat.chat_id,
                chat_type: chat.chat_type,
                message_id: message.message_id,
                message: message.content.clone(),
                message_type: message.message_type.clone(),
                sender: message.sender,
                receiver: chat.receiver_id,
                send_time: message.send_time.to_rfc3339(),
            },
        }
    }

    /// Encode the event as a JSON frame
    pub fn to_bytes(&self) -> Result<Bytes, SharedError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    /// Decode a frame produced by [`ChatEvent::to_bytes`]
    pub fn from_slice(frame: &[u8]) -> Result<Self, SharedError> {
        Ok(serde_json::from_slice(frame)?)
    }
}
