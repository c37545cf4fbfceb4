/**
 * Postgres Chat Repository
 *
 * [`ChatRepository`] over a `PgPool`. Every statement binds its inputs; the
 * one dynamic statement (group column update) only interpolates column names
 * taken from [`GROUP_COLUMNS`](super::repository::GROUP_COLUMNS).
 */

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::backend::chat::repository::{validate_group_columns, ChatRepository};
use crate::backend::error::BackendError;
use crate::shared::chat::{
    Chat, ChatType, CreateGroupRequest, Group, Message, NewMessage, UpdateGroupRequest, UserId,
};

const GROUP_FIELDS: &str = "id, name, username, description, created_by";
const CHAT_FIELDS: &str = "id, chat_type, creator, receiver_id, created_at";
const MESSAGE_FIELDS: &str = "id, chat_id, sender, content, message_type, send_time";

#[derive(sqlx::FromRow)]
struct GroupRow {
    id: i64,
    name: String,
    username: String,
    description: Option<String>,
    created_by: i64,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Group {
            group_id: row.id,
            name: row.name,
            username: row.username,
            description: row.description,
            created_by: row.created_by,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChatRow {
    id: i64,
    chat_type: String,
    creator: i64,
    receiver_id: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ChatRow> for Chat {
    type Error = BackendError;

    fn try_from(row: ChatRow) -> Result<Self, Self::Error> {
        Ok(Chat {
            chat_id: row.id,
            chat_type: row.chat_type.parse::<ChatType>()?,
            creator: row.creator,
            receiver_id: row.receiver_id,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    chat_id: i64,
    sender: i64,
    content: String,
    message_type: String,
    send_time: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            message_id: row.id,
            chat_id: row.chat_id,
            sender: row.sender,
            content: row.content,
            message_type: row.message_type,
            send_time: row.send_time,
        }
    }
}

/// Chat storage in PostgreSQL
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn affected_or_not_found(rows: u64, what: &str) -> Result<(), BackendError> {
    if rows == 0 {
        Err(BackendError::not_found(format!("{} not found", what)))
    } else {
        Ok(())
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn user_groups(&self, user_id: UserId) -> Result<Vec<Group>, BackendError> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT g.id, g.name, g.username, g.description, g.created_by
            FROM group_users AS gu
            INNER JOIN groups AS g ON g.id = gu.group_id
            WHERE g.deleted_at IS NULL
              AND gu.deleted_at IS NULL
              AND gu.user_id = $1
            ORDER BY g.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Group::from).collect())
    }

    async fn get_group(&self, group_id: i64) -> Result<Group, BackendError> {
        let query = format!("SELECT {} FROM groups WHERE deleted_at IS NULL AND id = $1", GROUP_FIELDS);
        sqlx::query_as::<_, GroupRow>(&query)
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Group::from)
            .ok_or_else(|| BackendError::not_found("group not found"))
    }

    async fn create_group(
        &self,
        request: &CreateGroupRequest,
        created_by: UserId,
    ) -> Result<Group, BackendError> {
        // Two auto-committed statements: a failed membership insert leaves
        // the group without its creator
        let query = format!(
            "INSERT INTO groups (name, username, description, created_by) VALUES ($1, $2, $3, $4) RETURNING {}",
            GROUP_FIELDS
        );
        let row = sqlx::query_as::<_, GroupRow>(&query)
            .bind(&request.name)
            .bind(&request.username)
            .bind(&request.description)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await?;

        sqlx::query("INSERT INTO group_users (group_id, user_id) VALUES ($1, $2)")
            .bind(row.id)
            .bind(created_by)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(group_id = row.id, created_by, error = %e, "Group created without its creator");
                e
            })?;

        tracing::info!(group_id = row.id, created_by, "Group created");
        Ok(row.into())
    }

    async fn update_group(
        &self,
        request: &UpdateGroupRequest,
        updated_by: UserId,
    ) -> Result<Group, BackendError> {
        let query = format!(
            r#"
            UPDATE groups
            SET name = $1, username = $2, description = $3, updated_by = $4, updated_at = NOW()
            WHERE deleted_at IS NULL AND id = $5
            RETURNING {}
            "#,
            GROUP_FIELDS
        );
        sqlx::query_as::<_, GroupRow>(&query)
            .bind(&request.name)
            .bind(&request.username)
            .bind(&request.description)
            .bind(updated_by)
            .bind(request.group_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Group::from)
            .ok_or_else(|| BackendError::not_found("group not found"))
    }

    async fn update_group_columns(
        &self,
        group_id: i64,
        fields: &HashMap<String, String>,
        updated_by: UserId,
    ) -> Result<Group, BackendError> {
        let columns = validate_group_columns(fields)?;

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE groups SET ");
        {
            let mut set = builder.separated(", ");
            for (column, value) in columns {
                set.push(column).push_unseparated(" = ").push_bind_unseparated(value);
            }
            set.push("updated_by = ").push_bind_unseparated(updated_by);
            set.push("updated_at = NOW()");
        }
        builder.push(" WHERE deleted_at IS NULL AND id = ").push_bind(group_id);
        builder.push(" RETURNING ").push(GROUP_FIELDS);

        builder
            .build_query_as::<GroupRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(Group::from)
            .ok_or_else(|| BackendError::not_found("group not found"))
    }

    async fn delete_group(&self, group_id: i64, deleted_by: UserId) -> Result<(), BackendError> {
        let result = sqlx::query(
            "UPDATE groups SET deleted_at = NOW(), deleted_by = $1 WHERE deleted_at IS NULL AND id = $2",
        )
        .bind(deleted_by)
        .bind(group_id)
        .execute(&self.pool)
        .await?;

        affected_or_not_found(result.rows_affected(), "group")
    }

    async fn add_user_to_group(&self, group_id: i64, user_id: UserId) -> Result<(), BackendError> {
        self.get_group(group_id).await?;

        sqlx::query(
            r#"
            INSERT INTO group_users (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (group_id, user_id) DO UPDATE SET deleted_at = NULL
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_user_from_group(&self, group_id: i64, user_id: UserId) -> Result<(), BackendError> {
        let result = sqlx::query(
            "UPDATE group_users SET deleted_at = NOW() WHERE group_id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        affected_or_not_found(result.rows_affected(), "group member")
    }

    async fn group_members(&self, group_id: i64) -> Result<Vec<UserId>, BackendError> {
        let members = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT gu.user_id
            FROM group_users AS gu
            INNER JOIN groups AS g ON g.id = gu.group_id
            WHERE g.deleted_at IS NULL
              AND gu.deleted_at IS NULL
              AND gu.group_id = $1
            ORDER BY gu.user_id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    async fn create_chat(
        &self,
        creator: UserId,
        chat_type: ChatType,
        receiver_id: i64,
    ) -> Result<Chat, BackendError> {
        let query = format!(
            "INSERT INTO chat (chat_type, creator, receiver_id) VALUES ($1, $2, $3) RETURNING {}",
            CHAT_FIELDS
        );
        let row = sqlx::query_as::<_, ChatRow>(&query)
            .bind(chat_type.as_str())
            .bind(creator)
            .bind(receiver_id)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(chat_id = row.id, %chat_type, creator, "Chat created");
        row.try_into()
    }

    async fn get_chat(&self, chat_id: i64) -> Result<Chat, BackendError> {
        let query = format!("SELECT {} FROM chat WHERE deleted_at IS NULL AND id = $1", CHAT_FIELDS);
        sqlx::query_as::<_, ChatRow>(&query)
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BackendError::not_found("chat not found"))?
            .try_into()
    }

    async fn delete_chat(&self, chat_id: i64) -> Result<(), BackendError> {
        let result = sqlx::query("UPDATE chat SET deleted_at = NOW() WHERE deleted_at IS NULL AND id = $1")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        affected_or_not_found(result.rows_affected(), "chat")
    }

    async fn user_chats(&self, user_id: UserId) -> Result<Vec<Chat>, BackendError> {
        let rows = sqlx::query_as::<_, ChatRow>(
            r#"
            SELECT c.id, c.chat_type, c.creator, c.receiver_id, c.created_at
            FROM chat AS c
            WHERE c.deleted_at IS NULL
              AND (
                c.creator = $1
                OR (c.chat_type = 'private' AND c.receiver_id = $1)
                OR (c.chat_type = 'group' AND EXISTS (
                    SELECT 1
                    FROM group_users AS gu
                    INNER JOIN groups AS g ON g.id = gu.group_id
                    WHERE gu.group_id = c.receiver_id
                      AND gu.user_id = $1
                      AND gu.deleted_at IS NULL
                      AND g.deleted_at IS NULL
                ))
              )
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Chat::try_from).collect()
    }

    async fn create_message(&self, message: &NewMessage) -> Result<Message, BackendError> {
        let query = format!(
            "INSERT INTO messages (chat_id, sender, content, message_type) VALUES ($1, $2, $3, $4) RETURNING {}",
            MESSAGE_FIELDS
        );
        let row = sqlx::query_as::<_, MessageRow>(&query)
            .bind(message.chat_id)
            .bind(message.sender)
            .bind(&message.content)
            .bind(&message.message_type)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn update_message(
        &self,
        message_id: i64,
        chat_id: i64,
        sender: UserId,
        content: &str,
    ) -> Result<Message, BackendError> {
        let query = format!(
            r#"
            UPDATE messages
            SET content = $1, updated_at = NOW()
            WHERE deleted_at IS NULL AND id = $2 AND chat_id = $3 AND sender = $4
            RETURNING {}
            "#,
            MESSAGE_FIELDS
        );
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(content)
            .bind(message_id)
            .bind(chat_id)
            .bind(sender)
            .fetch_optional(&self.pool)
            .await?
            .map(Message::from)
            .ok_or_else(|| BackendError::not_found("message not found"))
    }

    async fn delete_message(&self, message_id: i64, sender: UserId) -> Result<Message, BackendError> {
        let query = format!(
            r#"
            UPDATE messages
            SET deleted_at = NOW()
            WHERE deleted_at IS NULL AND id = $1 AND sender = $2
            RETURNING {}
            "#,
            MESSAGE_FIELDS
        );
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(message_id)
            .bind(sender)
            .fetch_optional(&self.pool)
            .await?
            .map(Message::from)
            .ok_or_else(|| BackendError::not_found("message not found"))
    }

    async fn chat_messages(&self, chat_id: i64) -> Result<Vec<Message>, BackendError> {
        self.get_chat(chat_id).await?;

        let query = format!(
            "SELECT {} FROM messages WHERE deleted_at IS NULL AND chat_id = $1 ORDER BY send_time, id",
            MESSAGE_FIELDS
        );
        let rows = sqlx::query_as::<_, MessageRow>(&query)
            .bind(chat_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }
}
