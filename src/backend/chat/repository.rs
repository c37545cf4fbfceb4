/**
 * Chat Repository
 *
 * Storage interface for chats, groups, group membership and messages. The
 * handlers and the delivery service only see this trait; the Postgres
 * implementation lives in `db.rs` and the tests use an in-memory one.
 *
 * # Conventions
 *
 * - Rows are soft-deleted; deleted rows behave as missing everywhere.
 * - An operation that addresses a missing row returns
 *   `BackendError::NotFound`.
 * - Updates and deletes of messages are limited to their sender.
 */

use std::collections::HashMap;

use async_trait::async_trait;

use crate::backend::error::BackendError;
use crate::shared::chat::{
    Chat, ChatType, CreateGroupRequest, Group, Message, NewMessage, UpdateGroupRequest, UserId,
};

/// Group columns a `PATCH /v1/group/{id}` may touch
pub const GROUP_COLUMNS: [&str; 3] = ["name", "username", "description"];

/// Check a column update against [`GROUP_COLUMNS`].
///
/// # Returns
///
/// The column/value pairs sorted by column name, so statements built from
/// them are stable.
///
/// # Errors
///
/// 400 when `fields` is empty or names a column outside the whitelist.
pub fn validate_group_columns(
    fields: &HashMap<String, String>,
) -> Result<Vec<(&'static str, String)>, BackendError> {
    if fields.is_empty() {
        return Err(BackendError::bad_request("no fields to update"));
    }

    let mut columns = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let column = GROUP_COLUMNS
            .iter()
            .find(|c| **c == key.as_str())
            .ok_or_else(|| BackendError::bad_request(format!("column '{}' cannot be updated", key)))?;
        columns.push((*column, value.clone()));
    }
    columns.sort_by_key(|(column, _)| *column);
    Ok(columns)
}

/// Relational storage used by the chat API
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Active groups `user_id` is an active member of
    async fn user_groups(&self, user_id: UserId) -> Result<Vec<Group>, BackendError>;

    async fn get_group(&self, group_id: i64) -> Result<Group, BackendError>;

    /// Create a group; the creator becomes its first member
    async fn create_group(
        &self,
        request: &CreateGroupRequest,
        created_by: UserId,
    ) -> Result<Group, BackendError>;

    /// Replace name, username and description
    async fn update_group(
        &self,
        request: &UpdateGroupRequest,
        updated_by: UserId,
    ) -> Result<Group, BackendError>;

    /// Update the whitelisted columns named in `fields`
    async fn update_group_columns(
        &self,
        group_id: i64,
        fields: &HashMap<String, String>,
        updated_by: UserId,
    ) -> Result<Group, BackendError>;

    async fn delete_group(&self, group_id: i64, deleted_by: UserId) -> Result<(), BackendError>;

    /// Add a member, reviving a soft-deleted membership
    async fn add_user_to_group(&self, group_id: i64, user_id: UserId) -> Result<(), BackendError>;

    async fn remove_user_from_group(&self, group_id: i64, user_id: UserId) -> Result<(), BackendError>;

    /// Active members of an active group
    async fn group_members(&self, group_id: i64) -> Result<Vec<UserId>, BackendError>;

    async fn create_chat(
        &self,
        creator: UserId,
        chat_type: ChatType,
        receiver_id: i64,
    ) -> Result<Chat, BackendError>;

    async fn get_chat(&self, chat_id: i64) -> Result<Chat, BackendError>;

    async fn delete_chat(&self, chat_id: i64) -> Result<(), BackendError>;

    /// Chats `user_id` takes part in: created by them, private chats addressed
    /// to them, and chats of groups they belong to
    async fn user_chats(&self, user_id: UserId) -> Result<Vec<Chat>, BackendError>;

    async fn create_message(&self, message: &NewMessage) -> Result<Message, BackendError>;

    /// Replace the content of a message posted by `sender` in `chat_id`
    async fn update_message(
        &self,
        message_id: i64,
        chat_id: i64,
        sender: UserId,
        content: &str,
    ) -> Result<Message, BackendError>;

    /// Soft-delete a message posted by `sender`; returns the deleted row
    async fn delete_message(&self, message_id: i64, sender: UserId) -> Result<Message, BackendError>;

    /// Messages of a chat, oldest first
    async fn chat_messages(&self, chat_id: i64) -> Result<Vec<Message>, BackendError>;
}
