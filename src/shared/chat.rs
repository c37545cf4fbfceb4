//! Chat domain types
//!
//! Rows of the chat schema (chats, groups, messages) and the request/response
//! bodies of the chat API. Users are referenced only by their numeric id.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Identity of a user as issued by the auth collaborator
pub type UserId = i64;

/// Kind of a chat
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    /// One-to-one conversation; the chat's receiver is a user id
    Private,
    /// Group conversation; the chat's receiver is a group id
    Group,
}

impl ChatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Private => "private",
            ChatType::Group => "group",
        }
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatType {
    type Err = SharedError;

    /// Case-insensitive; anything but `private`/`group` is a validation error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "private" => Ok(ChatType::Private),
            "group" => Ok(ChatType::Group),
            _ => Err(SharedError::validation(
                "chat_type",
                "property chat type must be 'private' or 'group'",
            )),
        }
    }
}

/// A chat row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chat {
    pub chat_id: i64,
    pub chat_type: ChatType,
    pub creator: UserId,
    /// User id for private chats, group id for group chats
    pub receiver_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A group row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub group_id: i64,
    pub name: String,
    pub username: String,
    pub description: Option<String>,
    pub created_by: UserId,
}

/// A message row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message_id: i64,
    pub chat_id: i64,
    pub sender: UserId,
    pub content: String,
    pub message_type: String,
    pub send_time: DateTime<Utc>,
}

/// Fields of a message before it is persisted
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub chat_id: i64,
    pub sender: UserId,
    pub content: String,
    pub message_type: String,
}

fn default_message_type() -> String {
    "text".to_string()
}

/// Body of `POST /v1/group`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PUT /v1/group`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateGroupRequest {
    pub group_id: i64,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PATCH /v1/group/{id}`: column name to new value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateGroupColumns {
    pub fields: HashMap<String, String>,
}

/// Body of `POST /v1/send-message`
///
/// `chat_id` may be omitted (or zero) to open a new chat with `receiver`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub chat_id: Option<i64>,
    pub chat_type: String,
    pub receiver: i64,
    pub message: String,
    #[serde(default = "default_message_type")]
    pub message_type: String,
}

impl SendMessageRequest {
    /// Parse the chat type and reject empty bodies.
    pub fn validate(&self) -> Result<ChatType, SharedError> {
        let chat_type = self.chat_type.parse::<ChatType>()?;
        if self.message.trim().is_empty() {
            return Err(SharedError::validation("message", "message cannot be empty"));
        }
        Ok(chat_type)
    }

    /// The chat id to post into, if the client named an existing one
    pub fn existing_chat(&self) -> Option<i64> {
        self.chat_id.filter(|id| *id > 0)
    }
}

/// Body of `PUT /v1/update-message`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMessageRequest {
    pub chat_id: i64,
    pub message_id: i64,
    pub new_message: String,
}

/// Query of `DELETE /v1/chat-notifications`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadQuery {
    pub chat_id: i64,
    pub user_id: UserId,
    /// Number of messages read; omitted or zero clears the chat's entry
    #[serde(default)]
    pub count: u32,
}

/// Generic `{message}` response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseWithMessage {
    pub message: String,
}

impl ResponseWithMessage {
    pub fn success() -> Self {
        Self {
            message: "success".to_string(),
        }
    }
}

/// Response of `POST /v1/send-message` and `PUT /v1/update-message`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageResponse {
    pub chat_id: i64,
    pub message_id: i64,
    /// Recipients reached over a live connection
    pub pushed: Vec<UserId>,
    /// Recipients whose notification document was updated instead
    pub queued: Vec<UserId>,
}
